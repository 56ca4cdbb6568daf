// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scoped line printing into a transactional file

use crate::config::Options;
use crate::error::{ConfigError, SaferError};
use crate::handle::Handle;
use crate::mode::OpenMode;
use crate::open::open;
use std::fmt::Display;
use std::io::{self, Write};
use std::path::Path;

/// Print-like access to an open text handle
pub struct Printer<'h, 'a> {
    handle: &'h mut Handle<'a>,
}

impl Printer<'_, '_> {
    /// Write `value` followed by a newline
    pub fn print(&mut self, value: impl Display) -> io::Result<()> {
        self.print_end(value, "\n")
    }

    pub fn print_end(&mut self, value: impl Display, end: &str) -> io::Result<()> {
        write!(self.handle, "{value}{end}")
    }
}

/// Open `path` as text, hand a [`Printer`] to `f`, then close.
///
/// The file is committed only if `f` returns `Ok`; on `Err` it is rolled back
/// and `f`'s error is returned.
pub fn printer<'a, T, E>(
    path: impl AsRef<Path>,
    mode: &str,
    options: Options<'a>,
    f: impl FnOnce(&mut Printer<'_, 'a>) -> Result<T, E>,
) -> Result<T, E>
where
    E: From<SaferError>,
{
    let parsed = OpenMode::parse(mode).map_err(SaferError::from)?;
    if parsed.is_read() {
        return Err(SaferError::NotWritable(mode.to_string()).into());
    }
    if parsed.binary {
        return Err(SaferError::from(ConfigError::PrintToBinary).into());
    }

    let mut handle = open(path, mode, options)?;
    handle.within(|handle| f(&mut Printer { handle }))
}

#[cfg(test)]
#[path = "printer_tests.rs"]
mod tests;
