//! CLI help output specs
//!
//! Verify help text and usage errors.

use crate::prelude::*;

#[test]
fn dj_no_args_shows_usage_and_exits_2() {
    cli().exits(2).stderr_has("Usage:");
}

#[test]
fn dj_help_lists_commands() {
    cli()
        .args(&["--help"])
        .passes()
        .stdout_has("Usage:")
        .stdout_has("create")
        .stdout_has("read")
        .stdout_has("delete")
        .stdout_has("show");
}

#[test]
fn dj_create_help_lists_spec_flags() {
    cli()
        .args(&["create", "--help"])
        .passes()
        .stdout_has("--name")
        .stdout_has("--artifact")
        .stdout_has("--entry-point")
        .stdout_has("--staging-location")
        .stdout_has("--project");
}

#[test]
fn dj_version_shows_version() {
    cli().args(&["--version"]).passes().stdout_has("0.2");
}

#[test]
fn create_without_required_flags_is_usage_error() {
    let temp = Project::empty();
    temp.dj().args(&["create", "--name", "wordcount"]).exits(2).stderr_has("--artifact");
}

#[test]
fn unknown_output_format_is_usage_error() {
    cli().args(&["show", "-o", "yaml"]).exits(2);
}
