// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake sinks for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{Callback, Socket};
use std::io;
use std::sync::{Arc, Mutex};

/// Fake socket that records every `send` call
#[derive(Clone, Default)]
pub struct FakeSocket {
    sent: Arc<Mutex<Vec<Vec<u8>>>>,
    closed: Arc<Mutex<Vec<bool>>>,
    max_send: Option<usize>,
}

impl FakeSocket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept at most `max` bytes per send
    pub fn with_max_send(mut self, max: usize) -> Self {
        self.max_send = Some(max);
        self
    }

    /// Get every payload passed to `send`
    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Concatenation of the accepted bytes
    pub fn received(&self) -> Vec<u8> {
        let max = self.max_send.unwrap_or(usize::MAX);
        self.sent()
            .iter()
            .flat_map(|chunk| chunk[..chunk.len().min(max)].to_vec())
            .collect()
    }

    /// `failed` flags from every close call
    pub fn closes(&self) -> Vec<bool> {
        self.closed.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Socket for FakeSocket {
    fn send(&mut self, data: &[u8]) -> io::Result<usize> {
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(data.to_vec());
        Ok(data.len().min(self.max_send.unwrap_or(usize::MAX)))
    }

    fn recv(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Ok(0)
    }

    fn close(&mut self, failed: bool) -> io::Result<()> {
        self.closed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(failed);
        Ok(())
    }
}

/// Recorded callback invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackCall {
    Call(Vec<u8>),
    Close { failed: bool },
}

/// Fake callable that records calls and can simulate partial writes
#[derive(Clone, Default)]
pub struct RecordingCallback {
    calls: Arc<Mutex<Vec<CallbackCall>>>,
    accept: Option<usize>,
    fail_close: bool,
}

impl RecordingCallback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume at most `n` bytes per call and report the count
    pub fn accepting(mut self, n: usize) -> Self {
        self.accept = Some(n);
        self
    }

    /// Make `close` return an error
    pub fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    /// Get all recorded calls, closes included
    pub fn calls(&self) -> Vec<CallbackCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Payloads passed to `call`, as lossy UTF-8
    pub fn payloads(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                CallbackCall::Call(data) => Some(String::from_utf8_lossy(&data).into_owned()),
                CallbackCall::Close { .. } => None,
            })
            .collect()
    }

    fn record(&self, call: CallbackCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }
}

impl Callback for RecordingCallback {
    fn call(&mut self, data: &[u8]) -> io::Result<Option<usize>> {
        self.record(CallbackCall::Call(data.to_vec()));
        Ok(self.accept.map(|n| n.min(data.len())))
    }

    fn close(&mut self, failed: bool) -> io::Result<()> {
        self.record(CallbackCall::Close { failed });
        if self.fail_close {
            return Err(io::Error::other("close failed"));
        }
        Ok(())
    }
}
