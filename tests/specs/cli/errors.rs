//! Error rendering specs
//!
//! Failures print what went wrong and how to fix it, and never touch the target.

use crate::prelude::*;

#[test]
fn missing_directory_suggests_make_parents() {
    let temp = Project::empty();

    temp.safer()
        .args(&["write", "nested/out.txt"])
        .stdin("hello")
        .fails()
        .stderr_has("does not exist")
        .stderr_has("--make-parents");

    assert!(!temp.exists("nested"));
}

#[test]
fn stale_staging_file_is_reported() {
    let temp = Project::empty();
    temp.file("out.partial", "left over");

    temp.safer()
        .args(&["write", "out.txt", "--temp-file=out.partial"])
        .stdin("hello")
        .fails()
        .stderr_has("staging file")
        .stderr_has("already exists");

    assert_eq!(temp.read("out.partial"), "left over");
    assert!(!temp.exists("out.txt"));
}

#[test]
fn unknown_format_lists_choices() {
    let temp = Project::empty();
    temp.file("in.json", r#"{"a": 1}"#);

    temp.safer()
        .args(&["dump", "in.json", "out.ini"])
        .fails()
        .stderr_has("unknown serialization format 'ini'")
        .stderr_has("--format json");

    assert!(!temp.exists("out.ini"));
}

#[test]
fn unknown_subcommand_fails() {
    let temp = Project::empty();

    temp.safer().args(&["explode"]).fails();
}
