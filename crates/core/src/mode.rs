// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Open-mode strings (`"w"`, `"ab"`, `"r+"`, ...)

use crate::error::ConfigError;
use std::fmt;

/// What the mode intends to do with the target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Read,
    Write,
    Append,
    Exclusive,
}

/// A parsed open mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenMode {
    raw: String,
    pub intent: Intent,
    pub update: bool,
    pub binary: bool,
}

impl OpenMode {
    /// Parse a mode string made of `r w a x + b t`
    pub fn parse(mode: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidMode(mode.to_string());

        let mut intent = None;
        let mut update = false;
        let mut binary = false;
        let mut text = false;

        for c in mode.chars() {
            let next = match c {
                'r' => Intent::Read,
                'w' => Intent::Write,
                'a' => Intent::Append,
                'x' => Intent::Exclusive,
                '+' if !update => {
                    update = true;
                    continue;
                }
                'b' if !binary => {
                    binary = true;
                    continue;
                }
                't' if !text => {
                    text = true;
                    continue;
                }
                _ => return Err(invalid()),
            };
            if intent.replace(next).is_some() {
                return Err(invalid());
            }
        }

        if binary && text {
            return Err(ConfigError::IncompatibleMode);
        }

        Ok(Self {
            raw: mode.to_string(),
            intent: intent.ok_or_else(invalid)?,
            update,
            binary,
        })
    }

    /// Plain `r` or `rb`: nothing will be written
    pub fn is_read(&self) -> bool {
        self.intent == Intent::Read && !self.update
    }

    /// Whether existing target content must be seeded into the stage
    pub fn is_copy(&self) -> bool {
        self.intent == Intent::Append || (self.update && self.intent != Intent::Write)
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Whether a stream mode string accepts writes (`w`, `a`, `x` or `+`)
pub fn is_write_mode(mode: &str) -> bool {
    mode.chars().any(|c| matches!(c, 'w' | 'a' | 'x' | '+'))
}

#[cfg(test)]
#[path = "mode_tests.rs"]
mod tests;
