// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transactional closer
//!
//! Owns the stream stack of an open handle and drives the
//! [`Transaction`] state machine to a terminal state, executing each
//! effect against the commit strategy chosen when the handle was opened.

use crate::config::DryRun;
use crate::error::SaferError;
use crate::layers::StreamLayer;
use crate::passthrough::{replay, replay_chunked};
use crate::sink::Sink;
use crate::staging::{DiskStage, RawSink};
use crate::transaction::{Outcome, Transaction, TxEffect, TxInput};
use std::collections::VecDeque;
use std::fs;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// How staged content reaches its destination
pub enum Strategy<'a> {
    /// Disk stage renamed over a named target
    FileRename {
        target: PathBuf,
        stage: DiskStage,
        dry_run: DryRun<'a>,
        new_file_mode: Option<u32>,
    },
    /// Memory stage replayed into a sink
    MemoryReplay { sink: Sink<'a> },
    /// Disk stage replayed into a sink in fixed-size chunks
    FileReplay {
        sink: Sink<'a>,
        stage: DiskStage,
        chunk_size: usize,
    },
}

impl Strategy<'_> {
    pub fn describe(&self) -> String {
        match self {
            Strategy::FileRename { target, .. } => target.display().to_string(),
            Strategy::MemoryReplay { sink } | Strategy::FileReplay { sink, .. } => sink.describe(),
        }
    }

    fn commit(&mut self, raw: RawSink) -> io::Result<()> {
        match (self, raw) {
            (
                Strategy::FileRename {
                    target,
                    stage,
                    dry_run,
                    new_file_mode,
                },
                RawSink::Disk(mut file),
            ) => {
                if let DryRun::Callback(f) = dry_run {
                    let mut staged = Vec::new();
                    file.seek(SeekFrom::Start(0))?;
                    file.read_to_end(&mut staged)?;
                    f(&staged);
                }
                drop(file);

                if dry_run.is_active() {
                    return stage.remove();
                }
                copy_permissions(stage.path(), target, *new_file_mode)?;
                stage.persist(target)?;
                tracing::debug!(target = %target.display(), "renamed staging file over target");
                Ok(())
            }
            (Strategy::MemoryReplay { sink }, RawSink::Memory(data)) => {
                replay(sink, &data)?;
                sink.flush()?;
                if let Sink::File { .. } = sink {
                    sink.close(false)?;
                }
                tracing::debug!(bytes = data.len(), "replayed memory stage");
                Ok(())
            }
            (
                Strategy::FileReplay {
                    sink,
                    stage,
                    chunk_size,
                },
                RawSink::Disk(mut file),
            ) => {
                replay_chunked(sink, &mut file, *chunk_size)?;
                sink.flush()?;
                drop(file);
                stage.remove()
            }
            (_, raw) => Err(io::Error::other(format!(
                "{:?} staging does not match the commit strategy",
                raw.kind()
            ))),
        }
    }

    fn rollback(&mut self) -> io::Result<()> {
        match self {
            Strategy::FileRename { stage, .. } | Strategy::FileReplay { stage, .. } => {
                stage.discard()
            }
            Strategy::MemoryReplay { .. } => Ok(()),
        }
    }

    fn close_external(&mut self, failed: bool) -> io::Result<()> {
        match self {
            Strategy::MemoryReplay { sink } | Strategy::FileReplay { sink, .. } => {
                sink.close(failed)
            }
            Strategy::FileRename { .. } => Ok(()),
        }
    }
}

#[cfg(unix)]
fn copy_permissions(stage: &Path, target: &Path, new_file_mode: Option<u32>) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    match fs::metadata(target) {
        Ok(meta) => fs::set_permissions(stage, meta.permissions()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => match new_file_mode {
            Some(mode) => fs::set_permissions(stage, fs::Permissions::from_mode(mode)),
            None => Ok(()),
        },
        Err(e) => Err(e),
    }
}

#[cfg(not(unix))]
fn copy_permissions(stage: &Path, target: &Path, _new_file_mode: Option<u32>) -> io::Result<()> {
    match fs::metadata(target) {
        Ok(meta) => fs::set_permissions(stage, meta.permissions()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Drives one handle from open to committed or rolled back
pub struct Closer<'a> {
    tx: Transaction,
    stream: Option<Box<dyn StreamLayer>>,
    strategy: Strategy<'a>,
    close_on_exit: bool,
}

impl<'a> Closer<'a> {
    pub fn new(stream: Box<dyn StreamLayer>, strategy: Strategy<'a>, close_on_exit: bool) -> Self {
        Self {
            tx: Transaction::new(),
            stream: Some(stream),
            strategy,
            close_on_exit,
        }
    }

    pub fn transaction(&self) -> &Transaction {
        &self.tx
    }

    /// The outermost stream layer, while the transaction is open
    pub fn stream(&mut self) -> Result<&mut (dyn StreamLayer + 'static), SaferError> {
        match self.stream.as_deref_mut() {
            Some(stream) if self.tx.is_open() => Ok(stream),
            _ => Err(SaferError::AlreadyClosed),
        }
    }

    /// Mark the transaction failed; a no-op once closed
    pub fn fail(&mut self) {
        if let Ok((next, _)) = self.tx.transition(TxInput::Fail) {
            self.tx = next;
        }
    }

    /// Run the close protocol.
    ///
    /// The first error raised along the way is returned after cleanup has run.
    /// Closing a finished transaction returns its recorded outcome.
    pub fn close(&mut self) -> Result<Outcome, SaferError> {
        if let Some(outcome) = self.tx.outcome() {
            return Ok(outcome);
        }

        let span = tracing::info_span!(
            "safer.close",
            target = %self.strategy.describe(),
            failed = self.tx.failed,
        );
        let _guard = span.enter();

        let mut raw: Option<RawSink> = None;
        let mut first_error: Option<SaferError> = None;
        let mut inputs = VecDeque::from([TxInput::Close]);

        while let Some(input) = inputs.pop_front() {
            let (next, effects) = self.tx.transition(input)?;
            self.tx = next;

            for effect in effects {
                match effect {
                    TxEffect::FinishLayers => match self.stream.take().map(|s| s.finish()) {
                        Some(Ok(finished)) => {
                            raw = Some(finished);
                            inputs.push_back(TxInput::LayersFinished);
                        }
                        Some(Err(e)) => {
                            tracing::error!(error = %e, "flushing staged data failed");
                            first_error.get_or_insert(SaferError::Io(e));
                            inputs.push_back(TxInput::LayersFailed);
                        }
                        None => {
                            first_error.get_or_insert(SaferError::AlreadyClosed);
                            inputs.push_back(TxInput::LayersFailed);
                        }
                    },
                    TxEffect::Commit => {
                        let result = match raw.take() {
                            Some(staged) => self.strategy.commit(staged),
                            None => Err(io::Error::other("nothing staged to commit")),
                        };
                        match result {
                            Ok(()) => inputs.push_back(TxInput::CommitDone),
                            Err(e) => {
                                tracing::error!(error = %e, "commit failed");
                                first_error
                                    .get_or_insert(SaferError::commit(self.strategy.describe(), e));
                                inputs.push_back(TxInput::CommitFailed);
                            }
                        }
                    }
                    TxEffect::Rollback => {
                        raw = None;
                        if let Err(e) = self.strategy.rollback() {
                            tracing::error!(error = %e, "rollback cleanup failed");
                        }
                        inputs.push_back(TxInput::RollbackDone);
                    }
                    TxEffect::CloseExternal { failed } => {
                        if !self.close_on_exit {
                            continue;
                        }
                        if let Err(e) = self.strategy.close_external(failed) {
                            if first_error.is_some() {
                                tracing::error!(error = %e, "closing sink failed");
                            } else {
                                first_error = Some(SaferError::Io(e));
                            }
                        }
                    }
                }
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }
        let outcome = self.tx.outcome().ok_or_else(|| {
            SaferError::InvalidTransition(format!("{:?} after close", self.tx.state))
        })?;
        tracing::debug!(?outcome, "closed");
        Ok(outcome)
    }
}

impl std::fmt::Debug for Closer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Closer")
            .field("tx", &self.tx)
            .field("target", &self.strategy.describe())
            .field("close_on_exit", &self.close_on_exit)
            .finish()
    }
}

#[cfg(test)]
#[path = "closer_tests.rs"]
mod tests;
