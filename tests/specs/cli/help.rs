//! Help and version specs

use crate::prelude::*;

#[test]
fn help_lists_commands() {
    let temp = Project::empty();

    temp.safer()
        .args(&["--help"])
        .passes()
        .stdout_has("write")
        .stdout_has("dump")
        .stdout_has("--config");
}

#[test]
fn write_help_lists_staging_flags() {
    let temp = Project::empty();

    temp.safer()
        .args(&["write", "--help"])
        .passes()
        .stdout_has("--temp-file")
        .stdout_has("--keep-failures")
        .stdout_has("--dry-run");
}

#[test]
fn version_is_reported() {
    let temp = Project::empty();

    temp.safer()
        .args(&["--version"])
        .passes()
        .stdout_has("safer");
}
