//! `safer dump` format specs

use crate::prelude::*;

#[test]
fn json_to_yaml_by_extension() {
    let temp = Project::empty();
    temp.file("in.json", r#"{"name": "widget", "count": 3}"#);

    temp.safer().args(&["dump", "in.json", "out.yaml"]).passes();

    let out = temp.read("out.yaml");
    assert!(out.contains("name: widget"));
    assert!(out.contains("count: 3"));
}

#[test]
fn yaml_to_toml_by_extension() {
    let temp = Project::empty();
    temp.file("in.yml", "name: widget\ntags:\n  - a\n  - b\n");

    temp.safer().args(&["dump", "in.yml", "out.toml"]).passes();

    let out = temp.read("out.toml");
    assert!(out.contains("name = \"widget\""));
    assert!(out.contains("tags = ["));
}

#[test]
fn toml_to_stdout_as_json() {
    let temp = Project::empty();
    temp.file("in.toml", "answer = 42\n");

    temp.safer()
        .args(&["dump", "in.toml", "-"])
        .passes()
        .stdout_eq("{\n  \"answer\": 42\n}");
}

#[test]
fn explicit_format_wins() {
    let temp = Project::empty();
    temp.file("in.json", r#"{"a": 1}"#);

    temp.safer()
        .args(&["dump", "in.json", "out.json", "--format", "yaml"])
        .passes();

    assert_eq!(temp.read("out.json"), "a: 1\n");
}

#[test]
fn unrepresentable_value_leaves_target_unchanged() {
    let temp = Project::empty();
    temp.file("in.json", r#"{"a": null}"#);
    temp.file("out.toml", "kept = true\n");

    temp.safer()
        .args(&["dump", "in.json", "out.toml"])
        .fails()
        .stderr_has("toml");

    assert_eq!(temp.read("out.toml"), "kept = true\n");
    assert_eq!(temp.entries("."), vec!["in.json", "out.toml"]);
}

#[test]
fn unreadable_input_is_reported() {
    let temp = Project::empty();

    temp.safer()
        .args(&["dump", "missing.json", "out.json"])
        .fails()
        .stderr_has("missing.json");

    assert!(!temp.exists("out.json"));
}

#[test]
fn unknown_input_extension_names_the_input() {
    let temp = Project::empty();
    temp.file("in.ini", "name = widget\n");

    let run = temp
        .safer()
        .args(&["dump", "in.ini", "out.json"])
        .fails()
        .stderr_has("invalid input")
        .stderr_has("No parser for '.ini' input");
    assert!(!run.stderr().contains("--format json"));

    assert!(!temp.exists("out.json"));
}

#[test]
fn dump_dry_run_reports_size() {
    let temp = Project::empty();
    temp.file("in.json", r#"{"a": 1}"#);

    temp.safer()
        .args(&["dump", "in.json", "out.yaml", "--dry-run"])
        .passes()
        .stdout_has("dry run: would write 5 bytes to out.yaml");

    assert!(!temp.exists("out.yaml"));
}
