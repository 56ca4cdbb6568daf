// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transactional serialization

use crate::config::Options;
use crate::error::{DumpError, Result, SaferError};
use crate::sink::Target;
use crate::transaction::Outcome;
use crate::writer::writer;
use serde::Serialize;
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

/// Serialization format for [`dump`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Json,
    Toml,
    Yaml,
}

impl Format {
    /// Pick a format from a file extension; no extension means JSON
    pub fn from_extension(ext: &str) -> Result<Self, DumpError> {
        match ext.to_ascii_lowercase().as_str() {
            "" | "json" => Ok(Format::Json),
            "toml" => Ok(Format::Toml),
            "yml" | "yaml" => Ok(Format::Yaml),
            _ => Err(DumpError::UnknownFormat(ext.to_string())),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, DumpError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        Self::from_extension(ext)
    }

    pub fn name(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Toml => "toml",
            Format::Yaml => "yaml",
        }
    }

    /// Serialize `value` into `out`
    pub fn write<T, W>(self, value: &T, out: &mut W) -> Result<(), DumpError>
    where
        T: Serialize + ?Sized,
        W: Write,
    {
        match self {
            Format::Json => serde_json::to_writer_pretty(out, value)?,
            Format::Toml => {
                let text = toml::to_string_pretty(value)?;
                out.write_all(text.as_bytes())?;
            }
            Format::Yaml => serde_yaml::to_writer(out, value)?,
        }
        Ok(())
    }
}

impl FromStr for Format {
    type Err = DumpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s.trim_start_matches('.'))
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Serialize `value` into `target` transactionally.
///
/// Without an explicit `format`, a path target's extension picks one and
/// every other target gets JSON. If serialization fails part-way the
/// target is left untouched.
pub fn dump<'a, T>(
    value: &T,
    target: impl Into<Target<'a>>,
    format: Option<Format>,
    options: Options<'a>,
) -> Result<Outcome>
where
    T: Serialize + ?Sized,
{
    let target = target.into();
    let format = match (format, &target) {
        (Some(format), _) => format,
        (None, Target::Path(path)) => Format::from_path(path)?,
        (None, _) => Format::Json,
    };

    tracing::debug!(%format, target = target.kind(), "dumping value");
    let mut handle = writer(target, options)?;
    handle.within(|h| format.write(value, h).map_err(SaferError::from))?;
    handle
        .outcome()
        .ok_or_else(|| SaferError::InvalidTransition("dump finished without closing".into()))
}

#[cfg(test)]
#[path = "dump_tests.rs"]
mod tests;
