//! `safer write` commit specs

use crate::prelude::*;

#[test]
fn stdin_replaces_target() {
    let temp = Project::empty();
    temp.file("out.txt", "original");

    temp.safer()
        .args(&["write", "out.txt"])
        .stdin("hello\n")
        .passes()
        .stdout_eq("");

    assert_eq!(temp.read("out.txt"), "hello\n");
    assert_eq!(temp.entries("."), vec!["out.txt"]);
}

#[test]
fn append_keeps_existing_content() {
    let temp = Project::empty();
    temp.file("log.txt", "abc");

    temp.safer()
        .args(&["write", "log.txt", "--append"])
        .stdin("def")
        .passes();

    assert_eq!(temp.read("log.txt"), "abcdef");
}

#[test]
fn append_with_staging_file() {
    let temp = Project::empty();
    temp.file("log.txt", "abc");

    temp.safer()
        .args(&["write", "log.txt", "--append", "--temp-file"])
        .stdin("def")
        .passes();

    assert_eq!(temp.read("log.txt"), "abcdef");
    assert_eq!(temp.entries("."), vec!["log.txt"]);
}

#[test]
fn binary_copies_bytes_verbatim() {
    let temp = Project::empty();
    let bytes = vec![0u8, 0xff, 0xfe, b'\n', 0x80];

    temp.safer()
        .args(&["write", "blob.bin", "--binary"])
        .stdin(bytes.clone())
        .passes();

    assert_eq!(temp.read_bytes("blob.bin"), bytes);
}

#[test]
fn make_parents_creates_directories() {
    let temp = Project::empty();

    temp.safer()
        .args(&["write", "a/b/c.txt", "--make-parents"])
        .stdin("deep")
        .passes();

    assert_eq!(temp.read("a/b/c.txt"), "deep");
}

#[test]
fn named_staging_file_is_consumed() {
    let temp = Project::empty();

    temp.safer()
        .args(&["write", "out.txt", "--temp-file=out.partial"])
        .stdin("named")
        .passes();

    assert_eq!(temp.read("out.txt"), "named");
    assert!(!temp.exists("out.partial"));
}

#[test]
fn dry_run_reports_and_leaves_nothing() {
    let temp = Project::empty();

    temp.safer()
        .args(&["write", "out.txt", "--dry-run", "--temp-file"])
        .stdin("hello")
        .passes()
        .stdout_has("dry run: would write 5 bytes to out.txt");

    assert!(temp.entries(".").is_empty());
}

#[test]
fn empty_stdin_creates_empty_file() {
    let temp = Project::empty();

    temp.safer().args(&["write", "empty.txt"]).stdin("").passes();

    assert_eq!(temp.read("empty.txt"), "");
}
