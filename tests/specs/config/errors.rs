//! Configuration and bootstrap failures
//!
//! Startup failures are reported on stderr with exit code 1.

use crate::prelude::*;

#[test]
fn missing_default_config_fails() {
    let temp = Project::empty();
    temp.watch()
        .args(&["abc"])
        .fails()
        .code_eq(1)
        .stderr_has("failed to read config amqp.json");
}

#[test]
fn missing_explicit_config_fails() {
    let temp = Project::empty();
    temp.watch()
        .args(&["--config", "nope.json", "abc"])
        .fails()
        .code_eq(1)
        .stderr_has("failed to read config nope.json");
}

#[test]
fn config_path_from_environment() {
    let temp = Project::empty();
    temp.watch()
        .env("NETLAB_CONFIG", "from-env.json")
        .args(&["abc"])
        .fails()
        .stderr_has("failed to read config from-env.json");
}

#[test]
fn invalid_json_config_fails() {
    let temp = Project::empty();
    temp.file("amqp.json", "{ not json");
    temp.watch()
        .args(&["abc"])
        .fails()
        .code_eq(1)
        .stderr_has("invalid config amqp.json");
}

#[test]
fn unreachable_broker_fails() {
    let temp = Project::empty();
    temp.file("amqp.json", UNREACHABLE_CONFIG);
    temp.watch()
        .args(&["abc"])
        .fails()
        .code_eq(1)
        .stderr_has("connect failed")
        .stderr_lacks("guest:guest");
}
