//! CLI argument validation

use crate::prelude::*;

#[test]
fn no_workspace_is_usage_error() {
    cli().fails().code_eq(2).stderr_has("<WORKSPACE>");
}

#[test]
fn unknown_flag_is_usage_error() {
    cli()
        .args(&["--bogus", "abc"])
        .fails()
        .code_eq(2)
        .stderr_has("--bogus");
}
