// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Options for opening transactional handles
//!
//! [`Options`] is the builder handed to [`crate::open`], [`crate::writer`] and
//! friends. [`Settings`] is the serializable subset that can be loaded from a
//! TOML file and applied on top of a builder.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default block size for the buffering layer
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Largest buffer the block-buffering layer allocates up front
pub const MAX_BUFFER_SIZE: usize = 0x100000;

/// Default chunk size when replaying a disk stage into a sink
pub const DEFAULT_CHUNK_SIZE: usize = 0x100000;

/// Permission bits applied to a newly created target
pub const DEFAULT_FILE_MODE: u32 = 0o644;

/// How writes are buffered before they reach the staging resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Buffering {
    /// Block buffering with [`DEFAULT_BUFFER_SIZE`]
    #[default]
    Default,
    Unbuffered,
    /// Flush after every newline (text mode only)
    Line,
    /// Block buffering, capped at [`MAX_BUFFER_SIZE`]
    Block(usize),
}

/// Where uncommitted data lives
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TempFile {
    /// Growable in-memory buffer
    #[default]
    Memory,
    /// Collision-free file allocated next to the target (or in the system temp dir)
    Auto,
    /// Caller-chosen staging path; must not exist yet
    Named(PathBuf),
}

impl TempFile {
    pub fn is_disk(&self) -> bool {
        !matches!(self, TempFile::Memory)
    }
}

/// Dry-run policy: simulate the commit instead of performing it
#[derive(Default)]
pub enum DryRun<'a> {
    #[default]
    Off,
    /// Skip the real write and drop the staged content
    Discard,
    /// Skip the real write and hand the staged content to a callback
    Callback(Box<dyn FnMut(&[u8]) + 'a>),
}

impl<'a> DryRun<'a> {
    pub fn callback(f: impl FnMut(&[u8]) + 'a) -> Self {
        DryRun::Callback(Box::new(f))
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, DryRun::Off)
    }
}

impl fmt::Debug for DryRun<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DryRun::Off => write!(f, "Off"),
            DryRun::Discard => write!(f, "Discard"),
            DryRun::Callback(_) => write!(f, "Callback(..)"),
        }
    }
}

/// Options shared by every entry point
#[derive(Debug)]
pub struct Options<'a> {
    pub buffering: Buffering,
    /// Create missing parent directories of a file target
    pub make_parents: bool,
    /// Remove the staging file when the transaction rolls back
    pub delete_failures: bool,
    pub temp_file: TempFile,
    pub dry_run: DryRun<'a>,
    /// When false, bypass staging entirely
    pub enabled: bool,
    /// Explicit binary/text assertion for stream targets
    pub is_binary: Option<bool>,
    /// Close the wrapped sink after commit or rollback
    pub close_on_exit: bool,
    pub chunk_size: usize,
    /// Mode applied to a target that did not exist before commit.
    /// `None` keeps whatever the staging file was created with.
    pub new_file_mode: Option<u32>,
    /// Text encoding; only utf-8 is supported
    pub encoding: Option<String>,
    /// Newline translation for text mode
    pub newline: Option<String>,
}

impl Default for Options<'_> {
    fn default() -> Self {
        Self {
            buffering: Buffering::Default,
            make_parents: false,
            delete_failures: true,
            temp_file: TempFile::Memory,
            dry_run: DryRun::Off,
            enabled: true,
            is_binary: None,
            close_on_exit: false,
            chunk_size: DEFAULT_CHUNK_SIZE,
            new_file_mode: Some(DEFAULT_FILE_MODE),
            encoding: None,
            newline: None,
        }
    }
}

impl<'a> Options<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_buffering(mut self, buffering: Buffering) -> Self {
        self.buffering = buffering;
        self
    }

    pub fn with_make_parents(mut self, make_parents: bool) -> Self {
        self.make_parents = make_parents;
        self
    }

    pub fn with_delete_failures(mut self, delete_failures: bool) -> Self {
        self.delete_failures = delete_failures;
        self
    }

    pub fn with_temp_file(mut self, temp_file: TempFile) -> Self {
        self.temp_file = temp_file;
        self
    }

    pub fn with_dry_run(mut self, dry_run: DryRun<'a>) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_binary(mut self, is_binary: bool) -> Self {
        self.is_binary = Some(is_binary);
        self
    }

    pub fn with_close_on_exit(mut self, close_on_exit: bool) -> Self {
        self.close_on_exit = close_on_exit;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_new_file_mode(mut self, mode: Option<u32>) -> Self {
        self.new_file_mode = mode;
        self
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = Some(encoding.into());
        self
    }

    pub fn with_newline(mut self, newline: impl Into<String>) -> Self {
        self.newline = Some(newline.into());
        self
    }
}

/// Errors loading a settings file
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("io error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// File-backed defaults for [`Options`]
///
/// Every field is optional; only the keys present in the file override the
/// builder they are applied to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub buffering: Option<Buffering>,
    pub make_parents: Option<bool>,
    pub delete_failures: Option<bool>,
    pub temp_file: Option<TempFile>,
    pub dry_run: Option<bool>,
    pub chunk_size: Option<usize>,
    pub new_file_mode: Option<u32>,
}

impl Settings {
    /// Load settings from a TOML file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Overlay these settings onto `options`
    pub fn apply<'a>(&self, mut options: Options<'a>) -> Options<'a> {
        if let Some(buffering) = self.buffering {
            options.buffering = buffering;
        }
        if let Some(make_parents) = self.make_parents {
            options.make_parents = make_parents;
        }
        if let Some(delete_failures) = self.delete_failures {
            options.delete_failures = delete_failures;
        }
        if let Some(temp_file) = &self.temp_file {
            options.temp_file = temp_file.clone();
        }
        if self.dry_run == Some(true) && !options.dry_run.is_active() {
            options.dry_run = DryRun::Discard;
        }
        if let Some(chunk_size) = self.chunk_size {
            options.chunk_size = chunk_size;
        }
        if let Some(mode) = self.new_file_mode {
            options.new_file_mode = Some(mode);
        }
        options
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
