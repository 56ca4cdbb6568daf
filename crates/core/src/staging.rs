// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Staging allocator
//!
//! Decides where uncommitted data lives: a growable in-memory buffer, or a
//! staging file on disk. Auto-named staging files come from the OS unique
//! temp-name primitive (via `tempfile`), so a stale file left by an earlier
//! crash can never collide with a new one.

use crate::config::TempFile;
use crate::error::SaferError;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tempfile::TempPath;

const STAGING_PREFIX: &str = ".safer-";
const STAGING_SUFFIX: &str = ".tmp";

/// Backing kind of a staging resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagingKind {
    Memory,
    Disk,
}

/// The innermost byte sink of a handle
#[derive(Debug)]
pub enum RawSink {
    Memory(Vec<u8>),
    Disk(File),
}

impl RawSink {
    pub fn kind(&self) -> StagingKind {
        match self {
            RawSink::Memory(_) => StagingKind::Memory,
            RawSink::Disk(_) => StagingKind::Disk,
        }
    }

    /// Copy the existing content of `source` into the stage, byte for byte.
    ///
    /// With `rewind`, a disk stage is repositioned at the start so later writes
    /// overwrite the seeded bytes instead of following them.
    pub fn seed_from(&mut self, source: &Path, rewind: bool) -> io::Result<u64> {
        let mut src = File::open(source)?;
        match self {
            RawSink::Memory(buf) => Ok(src.read_to_end(buf)? as u64),
            RawSink::Disk(file) => {
                let copied = io::copy(&mut src, file)?;
                if rewind {
                    file.seek(SeekFrom::Start(0))?;
                }
                Ok(copied)
            }
        }
    }
}

impl Write for RawSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            RawSink::Memory(v) => {
                v.extend_from_slice(buf);
                Ok(buf.len())
            }
            RawSink::Disk(file) => file.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            RawSink::Memory(_) => Ok(()),
            RawSink::Disk(file) => file.flush(),
        }
    }
}

enum StagePath {
    Temp(TempPath),
    Named(PathBuf),
}

/// A staging file on disk, released exactly once by persist, discard or remove
pub struct DiskStage {
    path: PathBuf,
    state: Option<StagePath>,
    delete_failures: bool,
}

impl std::fmt::Debug for DiskStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiskStage")
            .field("path", &self.path)
            .field("released", &self.state.is_none())
            .field("delete_failures", &self.delete_failures)
            .finish()
    }
}

impl DiskStage {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the staging file is still owned by this stage
    pub fn is_live(&self) -> bool {
        self.state.is_some()
    }

    /// Atomically rename the staging file over `target`.
    ///
    /// On failure the stage stays live so a later discard can clean it up.
    pub fn persist(&mut self, target: &Path) -> io::Result<()> {
        match self.state.take() {
            Some(StagePath::Temp(temp)) => temp.persist(target).map_err(|e| {
                self.state = Some(StagePath::Temp(e.path));
                e.error
            }),
            Some(StagePath::Named(path)) => fs::rename(&path, target).map_err(|e| {
                self.state = Some(StagePath::Named(path));
                e
            }),
            None => Err(released()),
        }
    }

    /// Roll back: delete the staging file, or keep it when `delete_failures` is off
    pub fn discard(&mut self) -> io::Result<()> {
        if self.delete_failures {
            return self.remove();
        }
        let Some(state) = self.state.take() else {
            return Ok(());
        };
        let kept = match state {
            StagePath::Temp(temp) => temp.keep().map_err(|e| e.error)?,
            StagePath::Named(path) => path,
        };
        tracing::warn!(path = %kept.display(), "staging file saved");
        Ok(())
    }

    /// Delete the staging file regardless of policy
    pub fn remove(&mut self) -> io::Result<()> {
        match self.state.take() {
            Some(StagePath::Temp(temp)) => temp.close(),
            Some(StagePath::Named(path)) => match fs::remove_file(&path) {
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                other => other,
            },
            None => Ok(()),
        }
    }
}

fn released() -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, "staging file already released")
}

/// A freshly provisioned staging resource
#[derive(Debug)]
pub struct Allocation {
    pub raw: RawSink,
    pub stage: Option<DiskStage>,
}

/// Provision a staging resource.
///
/// `dir` is the directory of the target, or `None` for targets without one
/// (streams, sockets, callables), which stage in the system temp directory.
pub fn allocate(
    temp_file: &TempFile,
    dir: Option<&Path>,
    delete_failures: bool,
) -> Result<Allocation, SaferError> {
    let (file, stage) = match temp_file {
        TempFile::Memory => {
            return Ok(Allocation {
                raw: RawSink::Memory(Vec::new()),
                stage: None,
            })
        }
        TempFile::Auto => {
            let dir = dir.map(Path::to_path_buf).unwrap_or_else(std::env::temp_dir);
            let named = tempfile::Builder::new()
                .prefix(STAGING_PREFIX)
                .suffix(STAGING_SUFFIX)
                .tempfile_in(&dir)
                .map_err(|e| missing_dir(e, &dir))?;
            let (file, temp) = named.into_parts();
            let path = temp.to_path_buf();
            (file, (path, StagePath::Temp(temp)))
        }
        TempFile::Named(path) => {
            let file = OpenOptions::new()
                .read(true)
                .write(true)
                .create_new(true)
                .open(path)
                .map_err(|e| match e.kind() {
                    io::ErrorKind::AlreadyExists => SaferError::StagingCollision(path.clone()),
                    _ => missing_dir(e, path.parent().unwrap_or(Path::new("."))),
                })?;
            (file, (path.clone(), StagePath::Named(path.clone())))
        }
    };

    let (path, state) = stage;
    tracing::debug!(path = %path.display(), "allocated staging file");
    Ok(Allocation {
        raw: RawSink::Disk(file),
        stage: Some(DiskStage {
            path,
            state: Some(state),
            delete_failures,
        }),
    })
}

fn missing_dir(e: io::Error, dir: &Path) -> SaferError {
    if e.kind() == io::ErrorKind::NotFound {
        SaferError::DirectoryMissing(dir.to_path_buf())
    } else {
        SaferError::Io(e)
    }
}

#[cfg(test)]
#[path = "staging_tests.rs"]
mod tests;
