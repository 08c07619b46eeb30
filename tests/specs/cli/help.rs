//! CLI help output

use crate::prelude::*;

#[test]
fn help_shows_usage() {
    cli()
        .args(&["--help"])
        .passes()
        .stdout_has("Usage:")
        .stdout_has("<WORKSPACE>");
}

#[test]
fn help_lists_options() {
    cli()
        .args(&["--help"])
        .passes()
        .stdout_has("--config")
        .stdout_has("--env");
}

#[test]
fn version_shows_version() {
    cli().args(&["--version"]).passes().stdout_has("0.1");
}
