// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The handle returned by every entry point

use crate::closer::Closer;
use crate::error::SaferError;
use crate::passthrough::replay;
use crate::sink::Sink;
use crate::transaction::Outcome;
use std::fs::File;
use std::io::{self, Read, Write};

enum Inner<'a> {
    /// Writes are staged and committed or rolled back on close
    Staged(Closer<'a>),
    /// Plain file: read mode, or staging disabled
    File(Option<File>),
    /// Staging disabled for a non-file sink: writes go straight through
    Direct {
        sink: Sink<'a>,
        close_on_exit: bool,
        failed: bool,
    },
}

/// A writable (or, in read mode, readable) handle.
///
/// Staged handles must be closed with [`Handle::close`] to commit; dropping
/// one that is still open rolls it back.
pub struct Handle<'a> {
    inner: Inner<'a>,
    outcome: Option<Outcome>,
}

impl<'a> Handle<'a> {
    pub(crate) fn staged(closer: Closer<'a>) -> Self {
        Self {
            inner: Inner::Staged(closer),
            outcome: None,
        }
    }

    pub(crate) fn plain(file: File) -> Self {
        Self {
            inner: Inner::File(Some(file)),
            outcome: None,
        }
    }

    pub(crate) fn direct(sink: Sink<'a>, close_on_exit: bool) -> Self {
        Self {
            inner: Inner::Direct {
                sink,
                close_on_exit,
                failed: false,
            },
            outcome: None,
        }
    }

    /// Whether writes are staged rather than passed through
    pub fn is_transactional(&self) -> bool {
        matches!(self.inner, Inner::Staged(_))
    }

    /// Mark the write scope failed so that close rolls back
    pub fn fail(&mut self) {
        match &mut self.inner {
            Inner::Staged(closer) => closer.fail(),
            Inner::Direct { failed, .. } => *failed = true,
            Inner::File(_) => {}
        }
    }

    pub fn is_failed(&self) -> bool {
        match &self.inner {
            Inner::Staged(closer) => closer.transaction().failed,
            Inner::Direct { failed, .. } => *failed,
            Inner::File(_) => false,
        }
    }

    /// Outcome of the close, once closed
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Commit, or roll back if the handle was marked failed.
    ///
    /// Closing again returns the recorded outcome without repeating any work.
    pub fn close(&mut self) -> Result<Outcome, SaferError> {
        if let Some(outcome) = self.outcome {
            return Ok(outcome);
        }

        let outcome = match &mut self.inner {
            Inner::Staged(closer) => {
                let result = closer.close();
                self.outcome = closer.transaction().outcome();
                return result;
            }
            Inner::File(file) => {
                if let Some(mut f) = file.take() {
                    f.flush()?;
                }
                Outcome::Passthrough
            }
            Inner::Direct {
                sink,
                close_on_exit,
                failed,
            } => {
                let flushed = sink.flush();
                if *close_on_exit {
                    sink.close(*failed)?;
                }
                flushed?;
                Outcome::Passthrough
            }
        };
        self.outcome = Some(outcome);
        Ok(outcome)
    }

    /// Run `f` as the write scope of this handle.
    ///
    /// An `Err` from `f` marks the handle failed before it is closed; that
    /// error is returned even if closing fails too.
    pub fn within<T, E>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, E>) -> Result<T, E>
    where
        E: From<SaferError>,
    {
        match f(self) {
            Ok(value) => {
                self.close()?;
                Ok(value)
            }
            Err(e) => {
                self.fail();
                if let Err(close_err) = self.close() {
                    tracing::error!(error = %close_err, "close after failed write scope");
                }
                Err(e)
            }
        }
    }
}

impl Write for Handle<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let result = match &mut self.inner {
            Inner::Staged(closer) => closer.stream()?.write(buf),
            Inner::File(Some(file)) => file.write(buf),
            Inner::File(None) => Err(SaferError::AlreadyClosed.into()),
            Inner::Direct { .. } if self.outcome.is_some() => Err(SaferError::AlreadyClosed.into()),
            Inner::Direct { sink, .. } => replay(sink, buf).map(|()| buf.len()),
        };
        // Staged data is incomplete once a write fails
        if result.is_err() && self.outcome.is_none() {
            self.fail();
        }
        result
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.inner {
            Inner::Staged(closer) => match closer.stream() {
                Ok(stream) => stream.flush(),
                Err(_) => Ok(()),
            },
            Inner::File(Some(file)) => file.flush(),
            Inner::File(None) => Ok(()),
            Inner::Direct { sink, .. } => sink.flush(),
        }
    }
}

impl Read for Handle<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.inner {
            Inner::File(Some(file)) => file.read(buf),
            Inner::File(None) => Err(SaferError::AlreadyClosed.into()),
            _ => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "handle is not open for reading",
            )),
        }
    }
}

impl Drop for Handle<'_> {
    fn drop(&mut self) {
        if self.outcome.is_some() {
            return;
        }
        let panicking = std::thread::panicking();
        if let Inner::Staged(closer) = &self.inner {
            if !panicking {
                tracing::warn!(?closer, "handle dropped without close, rolling back");
            }
            self.fail();
        } else if panicking {
            self.fail();
        }
        if let Err(e) = self.close() {
            tracing::error!(error = %e, "close on drop failed");
        }
    }
}

impl std::fmt::Debug for Handle<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("Handle");
        match &self.inner {
            Inner::Staged(closer) => s.field("closer", closer),
            Inner::File(file) => s.field("file", file),
            Inner::Direct { sink, failed, .. } => s.field("sink", sink).field("failed", failed),
        };
        s.field("outcome", &self.outcome).finish()
    }
}

#[cfg(test)]
#[path = "handle_tests.rs"]
mod tests;
