// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[test]
fn prints_lines_on_success() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("out.txt");

    printer(&target, "w", Options::new(), |p| -> Result<(), SaferError> {
        p.print("hello")?;
        p.print(42)?;
        p.print_end("no newline", "")?;
        Ok(())
    })
    .unwrap();

    assert_eq!(
        std::fs::read_to_string(&target).unwrap(),
        "hello\n42\nno newline"
    );
}

#[test]
fn failing_scope_leaves_file_alone() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("out.txt");
    std::fs::write(&target, "original").unwrap();

    let result = printer(&target, "w", Options::new(), |p| -> Result<(), SaferError> {
        p.print("half")?;
        Err(SaferError::Io(io::Error::other("interrupted")))
    });

    assert!(matches!(result, Err(SaferError::Io(e)) if e.to_string() == "interrupted"));
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "original");
}

#[parameterized(read = { "r" }, read_text = { "rt" })]
fn read_modes_are_not_writable(mode: &str) {
    let dir = tempfile::tempdir().unwrap();
    let result = printer(dir.path().join("x"), mode, Options::new(), |_| -> Result<(), SaferError> {
        Ok(())
    });

    assert!(matches!(result, Err(SaferError::NotWritable(_))));
}

#[parameterized(write = { "wb" }, append = { "ab" })]
fn binary_modes_cannot_print(mode: &str) {
    let dir = tempfile::tempdir().unwrap();
    let result = printer(dir.path().join("x"), mode, Options::new(), |_| -> Result<(), SaferError> {
        Ok(())
    });

    assert!(matches!(
        result,
        Err(SaferError::Config(ConfigError::PrintToBinary))
    ));
    assert!(!dir.path().join("x").exists());
}

#[test]
fn returns_the_scope_value() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("count");

    let printed = printer(&target, "a", Options::new(), |p| -> Result<usize, SaferError> {
        for i in 0..3 {
            p.print(i)?;
        }
        Ok(3)
    })
    .unwrap();

    assert_eq!(printed, 3);
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "0\n1\n2\n");
}
