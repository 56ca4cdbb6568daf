// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Layered stream builder
//!
//! Composes a raw sink with an optional block-buffering layer and, in text
//! mode, a text layer on top:
//!
//! ```text
//! TextLayer -> BufferLayer -> RawSink (memory buffer or staging file)
//! ```
//!
//! The outermost layer is the one the handle writes to. Finishing it flushes
//! every layer beneath and hands back the raw sink, so staged content is final
//! only after all buffered data has reached it.

use crate::config::{Buffering, DEFAULT_BUFFER_SIZE, MAX_BUFFER_SIZE};
use crate::error::ConfigError;
use crate::staging::RawSink;
use std::io::{self, BufWriter, Write};

/// One layer of a handle's stream stack
pub trait StreamLayer: Write {
    /// Flush this layer and all layers beneath it, returning the raw sink
    fn finish(self: Box<Self>) -> io::Result<RawSink>;
}

impl StreamLayer for RawSink {
    fn finish(mut self: Box<Self>) -> io::Result<RawSink> {
        self.flush()?;
        Ok(*self)
    }
}

/// Block-buffering layer
pub struct BufferLayer {
    inner: BufWriter<Box<dyn StreamLayer>>,
}

impl BufferLayer {
    pub fn new(inner: Box<dyn StreamLayer>, capacity: usize) -> Self {
        Self {
            inner: BufWriter::with_capacity(capacity, inner),
        }
    }
}

impl Write for BufferLayer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl StreamLayer for BufferLayer {
    fn finish(self: Box<Self>) -> io::Result<RawSink> {
        let inner = self.inner.into_inner().map_err(|e| e.into_error())?;
        inner.finish()
    }
}

/// Text layer: accepts only UTF-8, optionally translates newlines and
/// flushes per line.
///
/// A multi-byte character split across two writes is held back until it
/// completes.
pub struct TextLayer {
    inner: Box<dyn StreamLayer>,
    line_buffering: bool,
    newline: Option<String>,
    pending: Vec<u8>,
}

impl TextLayer {
    pub fn new(inner: Box<dyn StreamLayer>, line_buffering: bool, newline: Option<String>) -> Self {
        Self {
            inner,
            line_buffering,
            newline,
            pending: Vec::new(),
        }
    }

    fn emit(&mut self, text: &str) -> io::Result<()> {
        match self.newline.as_deref() {
            Some(nl) if !nl.is_empty() && nl != "\n" => {
                self.inner.write_all(text.replace('\n', nl).as_bytes())?
            }
            _ => self.inner.write_all(text.as_bytes())?,
        }
        if self.line_buffering && text.contains('\n') {
            self.inner.flush()?;
        }
        Ok(())
    }
}

impl Write for TextLayer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut data = std::mem::take(&mut self.pending);
        data.extend_from_slice(buf);

        let valid = match std::str::from_utf8(&data) {
            Ok(_) => data.len(),
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            Err(e) => {
                data.truncate(data.len() - buf.len());
                self.pending = data;
                return Err(io::Error::new(io::ErrorKind::InvalidData, e));
            }
        };

        let tail = data.split_off(valid);
        // `data` now holds only complete characters
        let text =
            String::from_utf8(data).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.emit(&text)?;
        self.pending = tail;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl StreamLayer for TextLayer {
    fn finish(self: Box<Self>) -> io::Result<RawSink> {
        if !self.pending.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "incomplete utf-8 sequence at close",
            ));
        }
        self.inner.finish()
    }
}

/// Layer configuration for one handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerSpec {
    pub binary: bool,
    pub buffering: Buffering,
    pub newline: Option<String>,
}

impl LayerSpec {
    pub fn new(binary: bool, buffering: Buffering) -> Self {
        Self {
            binary,
            buffering,
            newline: None,
        }
    }

    pub fn with_newline(mut self, newline: Option<String>) -> Self {
        self.newline = newline;
        self
    }

    /// Reject contradictory combinations before any resource is allocated
    pub fn validate(&self) -> Result<(), ConfigError> {
        match (self.binary, self.buffering) {
            (true, Buffering::Line) => return Err(ConfigError::LineBufferingInBinary),
            (false, Buffering::Unbuffered) => return Err(ConfigError::UnbufferedText),
            _ => {}
        }
        match self.newline.as_deref() {
            Some(_) if self.binary => Err(ConfigError::BinaryOptionInBinaryMode("a newline")),
            None | Some("" | "\n" | "\r" | "\r\n") => Ok(()),
            Some(other) => Err(ConfigError::InvalidNewline(other.to_string())),
        }
    }

    fn buffer_capacity(&self) -> Option<usize> {
        match self.buffering {
            Buffering::Default | Buffering::Line => Some(DEFAULT_BUFFER_SIZE),
            Buffering::Block(n) if n > 0 => Some(n.min(MAX_BUFFER_SIZE)),
            Buffering::Block(_) | Buffering::Unbuffered => None,
        }
    }
}

/// Stack layers over `raw` according to `spec`
pub fn build(raw: RawSink, spec: &LayerSpec) -> Result<Box<dyn StreamLayer>, ConfigError> {
    spec.validate()?;

    let is_disk = matches!(raw, RawSink::Disk(_));
    let mut stream: Box<dyn StreamLayer> = Box::new(raw);

    // A memory stage is already a buffer
    if is_disk {
        if let Some(capacity) = spec.buffer_capacity() {
            stream = Box::new(BufferLayer::new(stream, capacity));
        }
    }

    if !spec.binary {
        let line_buffering = spec.buffering == Buffering::Line;
        stream = Box::new(TextLayer::new(stream, line_buffering, spec.newline.clone()));
    }

    Ok(stream)
}

#[cfg(test)]
#[path = "layers_tests.rs"]
mod tests;
