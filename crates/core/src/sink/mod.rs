// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sink adapter
//!
//! Normalizes heterogeneous write targets into one [`Sink`] that accepts
//! bytes and can optionally be closed. [`classify`] is the only place a
//! [`Target`] is inspected; everything downstream works on the classified
//! sink.

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{CallbackCall, FakeSocket, RecordingCallback};

use crate::config::DryRun;
use crate::error::{ConfigError, SaferError};
use crate::mode::{is_write_mode, OpenMode};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::path::{Path, PathBuf};

/// A socket-like destination: something that can both send and receive
pub trait Socket {
    fn send(&mut self, data: &[u8]) -> io::Result<usize>;

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Called after commit or rollback when `close_on_exit` is set
    fn close(&mut self, _failed: bool) -> io::Result<()> {
        Ok(())
    }
}

impl Socket for TcpStream {
    fn send(&mut self, data: &[u8]) -> io::Result<usize> {
        Write::write(self, data)
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Read::read(self, buf)
    }

    fn close(&mut self, _failed: bool) -> io::Result<()> {
        self.shutdown(Shutdown::Both)
    }
}

#[cfg(unix)]
impl Socket for std::os::unix::net::UnixStream {
    fn send(&mut self, data: &[u8]) -> io::Result<usize> {
        Write::write(self, data)
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Read::read(self, buf)
    }

    fn close(&mut self, _failed: bool) -> io::Result<()> {
        self.shutdown(Shutdown::Both)
    }
}

/// A callable destination.
///
/// `call` returns how many bytes were consumed, or `None` for "all of them".
pub trait Callback {
    fn call(&mut self, data: &[u8]) -> io::Result<Option<usize>>;

    /// Called after commit or rollback when `close_on_exit` is set
    fn close(&mut self, _failed: bool) -> io::Result<()> {
        Ok(())
    }
}

impl<F> Callback for F
where
    F: FnMut(&[u8]) -> io::Result<Option<usize>>,
{
    fn call(&mut self, data: &[u8]) -> io::Result<Option<usize>> {
        self(data)
    }
}

/// An already-open writable stream and the mode it was opened with
pub struct Stream<'a> {
    writer: Option<Box<dyn Write + 'a>>,
    mode: String,
}

impl<'a> Stream<'a> {
    pub fn new(writer: impl Write + 'a, mode: impl Into<String>) -> Self {
        Self {
            writer: Some(Box::new(writer)),
            mode: mode.into(),
        }
    }

    pub fn mode(&self) -> &str {
        &self.mode
    }

    fn is_binary(&self) -> bool {
        self.mode.contains('b')
    }

    fn writer(&mut self) -> io::Result<&mut Box<dyn Write + 'a>> {
        self.writer
            .as_mut()
            .ok_or_else(|| io::Error::other("stream is closed"))
    }
}

impl fmt::Debug for Stream<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream")
            .field("mode", &self.mode)
            .field("open", &self.writer.is_some())
            .finish()
    }
}

/// Where a transaction ultimately writes
pub enum Target<'a> {
    /// A named file
    Path(PathBuf),
    Stream(Stream<'a>),
    Socket(Box<dyn Socket + 'a>),
    Callable(Box<dyn Callback + 'a>),
    Stdout,
    Stderr,
}

impl Default for Target<'_> {
    fn default() -> Self {
        Target::Stdout
    }
}

impl<'a> Target<'a> {
    pub fn stream(writer: impl Write + 'a, mode: impl Into<String>) -> Self {
        Target::Stream(Stream::new(writer, mode))
    }

    pub fn socket(socket: impl Socket + 'a) -> Self {
        Target::Socket(Box::new(socket))
    }

    pub fn callable(callback: impl Callback + 'a) -> Self {
        Target::Callable(Box::new(callback))
    }

    /// A callable that always consumes everything it is given
    pub fn function(mut f: impl FnMut(&[u8]) + 'a) -> Self {
        Target::callable(move |data: &[u8]| {
            f(data);
            Ok(None)
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Target::Path(_) => "path",
            Target::Stream(_) => "stream",
            Target::Socket(_) => "socket",
            Target::Callable(_) => "callable",
            Target::Stdout => "stdout",
            Target::Stderr => "stderr",
        }
    }
}

impl fmt::Debug for Target<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Path(p) => f.debug_tuple("Path").field(p).finish(),
            Target::Stream(s) => f.debug_tuple("Stream").field(s).finish(),
            other => write!(f, "{}", other.kind()),
        }
    }
}

impl From<PathBuf> for Target<'_> {
    fn from(path: PathBuf) -> Self {
        Target::Path(path)
    }
}

impl From<&Path> for Target<'_> {
    fn from(path: &Path) -> Self {
        Target::Path(path.to_path_buf())
    }
}

impl From<&str> for Target<'_> {
    fn from(path: &str) -> Self {
        Target::Path(PathBuf::from(path))
    }
}

impl From<String> for Target<'_> {
    fn from(path: String) -> Self {
        Target::Path(PathBuf::from(path))
    }
}

/// A classified destination: the uniform "accepts bytes, maybe closeable" contract
pub enum Sink<'a> {
    /// A named file written in one go (memory-staged `open`)
    File {
        path: PathBuf,
        mode: OpenMode,
        file: Option<File>,
    },
    Stream(Stream<'a>),
    Socket(Box<dyn Socket + 'a>),
    Callable(Box<dyn Callback + 'a>),
    Stdout,
    Stderr,
    /// Dry run without a callback: everything is accepted and dropped
    Discard,
    /// Dry run with a callback
    DryRun(Box<dyn FnMut(&[u8]) + 'a>),
}

impl<'a> Sink<'a> {
    pub fn file(path: PathBuf, mode: OpenMode) -> Self {
        Sink::File {
            path,
            mode,
            file: None,
        }
    }

    /// Sink for a dry-run policy, if one is active
    pub fn for_dry_run(dry_run: DryRun<'a>) -> Option<Self> {
        match dry_run {
            DryRun::Off => None,
            DryRun::Discard => Some(Sink::Discard),
            DryRun::Callback(f) => Some(Sink::DryRun(f)),
        }
    }

    /// Offer `data`; returns the consumed count, or `None` when all was taken
    pub fn write_some(&mut self, data: &[u8]) -> io::Result<Option<usize>> {
        match self {
            Sink::File { path, mode, file } => {
                if file.is_none() {
                    *file = Some(open_for_commit(path, mode)?);
                }
                match file {
                    Some(f) => f.write(data).map(Some),
                    None => Err(io::Error::other("commit file is not open")),
                }
            }
            Sink::Stream(stream) => stream.writer()?.write(data).map(Some),
            Sink::Socket(socket) => socket.send(data).map(Some),
            Sink::Callable(callback) => callback.call(data),
            Sink::Stdout => io::stdout().write(data).map(Some),
            Sink::Stderr => io::stderr().write(data).map(Some),
            Sink::Discard => Ok(Some(data.len())),
            Sink::DryRun(f) => {
                f(data);
                Ok(None)
            }
        }
    }

    /// Push anything the sink itself buffers
    pub fn flush(&mut self) -> io::Result<()> {
        match self {
            Sink::File { file: Some(f), .. } => f.flush(),
            Sink::Stream(stream) => match stream.writer.as_mut() {
                Some(w) => w.flush(),
                None => Ok(()),
            },
            Sink::Stdout => io::stdout().flush(),
            Sink::Stderr => io::stderr().flush(),
            _ => Ok(()),
        }
    }

    /// Close the external resource, telling it whether the transaction failed
    pub fn close(&mut self, failed: bool) -> io::Result<()> {
        match self {
            Sink::File { file, .. } => {
                file.take();
                Ok(())
            }
            Sink::Stream(stream) => match stream.writer.take() {
                Some(mut w) if !failed => w.flush(),
                _ => Ok(()),
            },
            Sink::Socket(socket) => socket.close(failed),
            Sink::Callable(callback) => callback.close(failed),
            Sink::Stdout | Sink::Stderr => {
                Err(io::Error::other(SaferError::CannotCloseStandardStream))
            }
            Sink::Discard | Sink::DryRun(_) => Ok(()),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Sink::File { path, .. } => path.display().to_string(),
            Sink::Stream(s) => format!("stream({})", s.mode),
            Sink::Socket(_) => "socket".to_string(),
            Sink::Callable(_) => "callable".to_string(),
            Sink::Stdout => "stdout".to_string(),
            Sink::Stderr => "stderr".to_string(),
            Sink::Discard => "dry-run".to_string(),
            Sink::DryRun(_) => "dry-run callback".to_string(),
        }
    }
}

impl fmt::Debug for Sink<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sink({})", self.describe())
    }
}

fn open_for_commit(path: &Path, mode: &OpenMode) -> io::Result<File> {
    use crate::mode::Intent;

    let mut options = OpenOptions::new();
    match mode.intent {
        Intent::Append => options.append(true).create(true),
        Intent::Exclusive => options.write(true).create_new(true),
        Intent::Write | Intent::Read => options.write(true).create(true).truncate(true),
    };
    options.open(path)
}

/// The result of classifying a non-path target
#[derive(Debug)]
pub struct Classified<'a> {
    pub sink: Sink<'a>,
    pub is_binary: bool,
    pub close_on_exit: bool,
}

/// Classify `target` into exactly one sink kind and settle binary mode.
///
/// [`crate::writer`] routes path targets to [`crate::open`] first; a path that
/// reaches here becomes a file written in one go at commit.
pub fn classify<'a>(
    target: Target<'a>,
    is_binary: Option<bool>,
    close_on_exit: bool,
    dry_run: DryRun<'a>,
) -> Result<Classified<'a>, SaferError> {
    let dry_sink = Sink::for_dry_run(dry_run);
    let dry = dry_sink.is_some();
    let close_on_exit = close_on_exit && !dry;

    if close_on_exit && matches!(target, Target::Stdout | Target::Stderr) {
        return Err(SaferError::CannotCloseStandardStream);
    }

    let (sink, is_binary) = match target {
        Target::Path(path) => {
            let binary = is_binary.unwrap_or(false);
            let mode = OpenMode::parse(if binary { "wb" } else { "w" })?;
            (Sink::file(path, mode), binary)
        }
        Target::Stream(stream) => {
            let binary = check_stream_mode(stream.mode(), stream.is_binary(), is_binary)?;
            (Sink::Stream(stream), binary)
        }
        Target::Stdout => (Sink::Stdout, check_stream_mode("w", false, is_binary)?),
        Target::Stderr => (Sink::Stderr, check_stream_mode("w", false, is_binary)?),
        Target::Socket(socket) => {
            if is_binary == Some(false) {
                return Err(ConfigError::SocketRequiresBinary.into());
            }
            (Sink::Socket(socket), true)
        }
        Target::Callable(callback) => (Sink::Callable(callback), is_binary.unwrap_or(false)),
    };

    Ok(Classified {
        sink: dry_sink.unwrap_or(sink),
        is_binary,
        close_on_exit,
    })
}

fn check_stream_mode(
    mode: &str,
    detected: bool,
    asserted: Option<bool>,
) -> Result<bool, SaferError> {
    if !is_write_mode(mode) {
        return Err(SaferError::NotWritable(mode.to_string()));
    }
    match asserted {
        Some(binary) if binary != detected => Err(ConfigError::BinaryModeMismatch.into()),
        _ => Ok(detected),
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
