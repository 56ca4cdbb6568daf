//! `safer write` rollback specs
//!
//! When the copy fails the target keeps its previous content.

use crate::prelude::*;

#[test]
fn invalid_utf8_leaves_target_unchanged() {
    let temp = Project::empty();
    temp.file("out.txt", "original");

    temp.safer()
        .args(&["write", "out.txt"])
        .stdin(vec![b'o', b'k', 0xff, 0xfe])
        .fails()
        .stderr_has("UTF-8")
        .stderr_has("--binary");

    assert_eq!(temp.read("out.txt"), "original");
    assert_eq!(temp.entries("."), vec!["out.txt"]);
}

#[test]
fn truncated_character_at_end_rolls_back() {
    let temp = Project::empty();

    // First two bytes of a three-byte character
    temp.safer()
        .args(&["write", "out.txt", "--temp-file"])
        .stdin(vec![b'a', 0xe2, 0x82])
        .fails()
        .stderr_has("incomplete");

    assert!(temp.entries(".").is_empty());
}

#[test]
fn keep_failures_saves_staging_file() {
    let temp = Project::empty();
    temp.file("out.txt", "original");

    let run = temp
        .safer()
        .args(&["write", "out.txt", "--temp-file", "--keep-failures"])
        .stdin(vec![b'x', 0xff])
        .fails()
        .stderr_has("staging file saved");

    assert_eq!(temp.read("out.txt"), "original");

    let kept: Vec<String> = temp
        .entries(".")
        .into_iter()
        .filter(|name| name != "out.txt")
        .collect();
    assert_eq!(kept.len(), 1);
    assert!(run.stderr().contains(&kept[0]));
}

#[test]
fn diagnostics_can_be_silenced() {
    let temp = Project::empty();

    temp.safer()
        .args(&["write", "out.txt", "--temp-file", "--keep-failures"])
        .env("RUST_LOG", "off")
        .stdin(vec![0xff])
        .fails()
        .stderr_has("error:");

    assert!(!temp.exists("out.txt"));
}
