// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for transactional writes

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Contradictory or unsupported options, raised before any staging is allocated
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid mode: {0}")]
    InvalidMode(String),
    #[error("can't have text and binary mode at once")]
    IncompatibleMode,
    #[error("is_binary is inconsistent with the file stream")]
    BinaryModeMismatch,
    #[error("is_binary=false is inconsistent with a socket")]
    SocketRequiresBinary,
    #[error("line buffering is only supported in text mode")]
    LineBufferingInBinary,
    #[error("can't have unbuffered text I/O")]
    UnbufferedText,
    #[error("+ mode requires a temp_file argument")]
    UpdateRequiresTempFile,
    #[error("binary mode doesn't take {0} argument")]
    BinaryOptionInBinaryMode(&'static str),
    #[error("illegal newline value: {0:?}")]
    InvalidNewline(String),
    #[error("only utf-8 text encoding is supported, got {0}")]
    UnsupportedEncoding(String),
    #[error("cannot print to a file open in binary mode")]
    PrintToBinary,
    #[error("chunk_size must be positive")]
    ZeroChunkSize,
}

/// Errors that can occur while opening, writing or closing a transactional handle
#[derive(Debug, Error)]
pub enum SaferError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("directory does not exist: {}", .0.display())]
    DirectoryMissing(PathBuf),
    #[error("staging file already exists: {}", .0.display())]
    StagingCollision(PathBuf),
    #[error("file exists: {}", .0.display())]
    FileExists(PathBuf),
    #[error("stream mode \"{0}\" is not a write mode")]
    NotWritable(String),
    #[error("you cannot close stdout or stderr")]
    CannotCloseStandardStream,
    #[error("commit to {target} failed: {source}")]
    Commit {
        target: String,
        #[source]
        source: io::Error,
    },
    #[error("handle is already closed")]
    AlreadyClosed,
    #[error("invalid transaction transition: {0}")]
    InvalidTransition(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("dump error: {0}")]
    Dump(#[from] DumpError),
}

impl SaferError {
    pub(crate) fn commit(target: impl Into<String>, source: io::Error) -> Self {
        SaferError::Commit {
            target: target.into(),
            source,
        }
    }
}

/// Errors from serializing a value in [`crate::dump`]
#[derive(Debug, Error)]
pub enum DumpError {
    #[error("unknown serialization format: {0}")]
    UnknownFormat(String),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::ser::Error),
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl From<SaferError> for io::Error {
    fn from(err: SaferError) -> Self {
        match err {
            SaferError::Io(e) => e,
            SaferError::Commit { source, .. } => source,
            SaferError::DirectoryMissing(_) => io::Error::new(io::ErrorKind::NotFound, err),
            SaferError::FileExists(_) | SaferError::StagingCollision(_) => {
                io::Error::new(io::ErrorKind::AlreadyExists, err)
            }
            SaferError::Config(_) => io::Error::new(io::ErrorKind::InvalidInput, err),
            other => io::Error::other(other),
        }
    }
}

pub type Result<T, E = SaferError> = std::result::Result<T, E>;
