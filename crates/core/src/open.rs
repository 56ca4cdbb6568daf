// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transactional file open

use crate::closer::{Closer, Strategy};
use crate::config::Options;
use crate::error::{ConfigError, Result, SaferError};
use crate::handle::Handle;
use crate::layers::{self, LayerSpec};
use crate::mode::{Intent, OpenMode};
use crate::sink::Sink;
use crate::staging::allocate;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Open `path` for a transactional write.
///
/// Writes are staged (in memory, or in a staging file next to the target
/// when `options.temp_file` asks for one) and only reach `path` when the
/// returned handle is closed without having failed. Read modes and
/// `enabled = false` return a plain handle over the file itself.
pub fn open<'a>(path: impl AsRef<Path>, mode: &str, options: Options<'a>) -> Result<Handle<'a>> {
    let mode = OpenMode::parse(mode)?;
    let spec =
        LayerSpec::new(mode.binary, options.buffering).with_newline(options.newline.clone());
    check_encoding(mode.binary, options.encoding.as_deref())?;
    spec.validate()?;

    if mode.update && !options.temp_file.is_disk() && options.enabled {
        return Err(ConfigError::UpdateRequiresTempFile.into());
    }

    let path = normalize(path.as_ref())?;
    if mode.is_read() {
        return Ok(Handle::plain(open_plain(&path, &mode)?));
    }

    let parent = path.parent().map(Path::to_path_buf).unwrap_or_default();
    if !parent.as_os_str().is_empty() && !parent.is_dir() {
        if options.make_parents {
            fs::create_dir_all(&parent)?;
        } else {
            return Err(SaferError::DirectoryMissing(parent));
        }
    }

    if !options.enabled {
        return Ok(Handle::plain(open_plain(&path, &mode)?));
    }

    if mode.intent == Intent::Exclusive && path.exists() {
        return Err(SaferError::FileExists(path));
    }

    let mut alloc = allocate(&options.temp_file, Some(&parent), options.delete_failures)?;
    let strategy = match alloc.stage.take() {
        Some(mut stage) => {
            if mode.is_copy() && path.exists() {
                let rewind = mode.intent != Intent::Append;
                if let Err(e) = alloc.raw.seed_from(&path, rewind) {
                    stage.remove()?;
                    return Err(e.into());
                }
            }
            Strategy::FileRename {
                target: path,
                stage,
                dry_run: options.dry_run,
                new_file_mode: options.new_file_mode,
            }
        }
        None => Strategy::MemoryReplay {
            sink: Sink::for_dry_run(options.dry_run)
                .unwrap_or_else(|| Sink::file(path, mode.clone())),
        },
    };

    tracing::debug!(target = %strategy.describe(), %mode, "opened transactional handle");
    let stream = layers::build(alloc.raw, &spec)?;
    Ok(Handle::staged(Closer::new(stream, strategy, false)))
}

/// Only UTF-8 text is supported; binary handles take no encoding at all
pub(crate) fn check_encoding(binary: bool, encoding: Option<&str>) -> Result<(), ConfigError> {
    match encoding {
        None => Ok(()),
        Some(_) if binary => Err(ConfigError::BinaryOptionInBinaryMode("an encoding")),
        Some(enc) => match enc.to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" | "utf_8" => Ok(()),
            _ => Err(ConfigError::UnsupportedEncoding(enc.to_string())),
        },
    }
}

/// Make `path` absolute and resolve symlinks in every existing ancestor
pub(crate) fn normalize(path: &Path) -> io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;

    let mut missing = Vec::new();
    let mut current = absolute.as_path();
    loop {
        match fs::canonicalize(current) {
            Ok(real) => {
                return Ok(missing.iter().rev().fold(real, |acc: PathBuf, name| acc.join(name)));
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                match (current.file_name(), current.parent()) {
                    (Some(name), Some(parent)) => {
                        missing.push(name.to_os_string());
                        current = parent;
                    }
                    _ => return Ok(absolute),
                }
            }
            Err(e) => return Err(e),
        }
    }
}

fn open_plain(path: &Path, mode: &OpenMode) -> io::Result<File> {
    let mut options = OpenOptions::new();
    match mode.intent {
        Intent::Read => options.read(true).write(mode.update),
        Intent::Write => options.write(true).create(true).truncate(true).read(mode.update),
        Intent::Append => options.append(true).create(true).read(mode.update),
        Intent::Exclusive => options.write(true).create_new(true).read(mode.update),
    };
    options.open(path)
}

#[cfg(test)]
#[path = "open_tests.rs"]
mod tests;
