//! Settings file specs

use crate::prelude::*;

#[test]
fn config_file_sets_defaults() {
    let temp = Project::empty();
    temp.file("safer.toml", "make_parents = true\n");

    temp.safer()
        .args(&["--config", "safer.toml", "write", "a/b/out.txt"])
        .stdin("nested")
        .passes();

    assert_eq!(temp.read("a/b/out.txt"), "nested");
}

#[test]
fn config_dry_run_leaves_target_alone() {
    let temp = Project::empty();
    temp.file("safer.toml", "dry_run = true\n");
    temp.file("out.txt", "original");

    temp.safer()
        .args(&["--config", "safer.toml", "write", "out.txt"])
        .stdin("replacement")
        .passes();

    assert_eq!(temp.read("out.txt"), "original");
}

#[test]
fn unknown_config_key_is_rejected() {
    let temp = Project::empty();
    temp.file("safer.toml", "compress = true\n");

    temp.safer()
        .args(&["--config", "safer.toml", "write", "out.txt"])
        .stdin("x")
        .fails()
        .stderr_has("invalid settings")
        .stderr_has("Valid keys");

    assert!(!temp.exists("out.txt"));
}

#[test]
fn missing_config_file_fails() {
    let temp = Project::empty();

    temp.safer()
        .args(&["--config", "nope.toml", "write", "out.txt"])
        .stdin("x")
        .fails()
        .stderr_has("nope.toml");
}
