// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-friendly error display with context and suggestions.
//!
//! Library errors are rendered as:
//! - What went wrong (message)
//! - Why it might have happened (context)
//! - How to fix it (suggestions)

use safer_core::{ConfigError, DumpError, SaferError, SettingsError};
use std::fmt;
use std::path::Path;

const SETTINGS_KEYS: &[&str] = &[
    "buffering",
    "make_parents",
    "delete_failures",
    "temp_file",
    "dry_run",
    "chunk_size",
    "new_file_mode",
];

/// Error with context and recovery suggestions for user-friendly display.
#[derive(Debug)]
pub struct CliError {
    /// What went wrong
    pub message: String,
    /// Why it might have happened
    pub context: Vec<String>,
    /// How to fix it
    pub suggestions: Vec<String>,
}

impl CliError {
    /// Create a new error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    /// Add context about why this error might have happened.
    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    /// Add a suggestion for how to fix this error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Render any error that reached `main`
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        if let Some(safer) = err.downcast_ref::<SaferError>() {
            return Self::from_safer(safer);
        }
        if let Some(settings) = err.downcast_ref::<SettingsError>() {
            return Self::new(settings.to_string()).with_suggestion(format!(
                "Valid keys: {}",
                SETTINGS_KEYS.join(", ")
            ));
        }
        // Input documents are parsed before anything is staged
        if let Some(DumpError::UnknownFormat(ext)) = err.downcast_ref::<DumpError>() {
            return Self::new(err.to_string())
                .with_context(format!("No parser for '.{ext}' input"))
                .with_context("The input extension picks the parser; --format only sets the output")
                .with_suggestion("Rename the input to .json, .toml, .yaml or .yml");
        }
        let mut cli = Self::new(err.to_string());
        for cause in err.chain().skip(1) {
            cli = cli.with_context(cause.to_string());
        }
        cli
    }

    pub fn from_safer(err: &SaferError) -> Self {
        match err {
            SaferError::DirectoryMissing(dir) => Self::directory_missing(dir),
            SaferError::StagingCollision(path) => Self::staging_collision(path),
            SaferError::FileExists(path) => Self::new(format!("{} already exists", path.display()))
                .with_context("Exclusive mode never replaces an existing file"),
            SaferError::Commit { target, source } => {
                Self::new(format!("could not commit to {target}"))
                    .with_context(source.to_string())
                    .with_context("The target was left unchanged")
            }
            SaferError::Config(ConfigError::UpdateRequiresTempFile) => Self::new(err.to_string())
                .with_suggestion("Pass --temp-file to stage in a file next to the target"),
            SaferError::Dump(DumpError::UnknownFormat(ext)) => {
                Self::new(format!("unknown serialization format '{ext}'"))
                    .with_suggestion("Use a .json, .toml, .yaml or .yml extension")
                    .with_suggestion("Or pick one explicitly: --format json")
            }
            SaferError::Io(source) if source.kind() == std::io::ErrorKind::InvalidData => {
                Self::new(err.to_string())
                    .with_context("Text mode only accepts UTF-8 input")
                    .with_context("The target was left unchanged")
                    .with_suggestion("Pass --binary to copy bytes verbatim")
            }
            other => Self::new(other.to_string()),
        }
    }

    /// Error for when the target directory does not exist.
    pub fn directory_missing(dir: &Path) -> Self {
        CliError::new(format!("directory {} does not exist", dir.display()))
            .with_suggestion("Create it first, or pass --make-parents")
    }

    /// Error for when an explicit staging path is already taken.
    pub fn staging_collision(path: &Path) -> Self {
        CliError::new(format!("staging file {} already exists", path.display()))
            .with_context("It may be left over from an earlier failed write")
            .with_suggestion(format!("Inspect it, then remove it: rm {}", path.display()))
            .with_suggestion("Or let safer pick a fresh name: --temp-file")
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "error: {}", self.message)?;

        if !self.context.is_empty() {
            writeln!(f)?;
            for ctx in &self.context {
                writeln!(f, "  -> {}", ctx)?;
            }
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            writeln!(f, "suggestions:")?;
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for CliError {}
