// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! safer-core: all-or-nothing writes
//!
//! Output written through a [`Handle`] is staged (in memory or in a staging
//! file) and only reaches its destination when the handle closes cleanly.
//! If the write scope fails, the destination is left exactly as it was.
//!
//! ```no_run
//! use std::io::Write;
//!
//! let mut handle = safer_core::open("config.json", "w", safer_core::Options::new())?;
//! handle.within(|h| -> Result<(), safer_core::SaferError> {
//!     h.write_all(b"{}")?;
//!     Ok(())
//! })?;
//! # Ok::<(), safer_core::SaferError>(())
//! ```

pub mod config;
pub mod error;
pub mod mode;
pub mod sink;

// Staging and the close protocol (order follows data flow)
pub mod staging;
pub mod layers;
pub mod transaction;
pub mod passthrough;
pub mod closer;
pub mod handle;

// Entry points
mod dump;
mod open;
mod printer;
mod writer;

pub use config::{Buffering, DryRun, Options, Settings, SettingsError, TempFile};
pub use dump::{dump, Format};
pub use error::{ConfigError, DumpError, Result, SaferError};
pub use handle::Handle;
pub use mode::{Intent, OpenMode};
pub use open::open;
pub use printer::{printer, Printer};
pub use sink::{Callback, Socket, Stream, Target};
pub use transaction::{Outcome, Transaction, TxEffect, TxInput, TxState};
pub use writer::{closer, writer};

#[cfg(any(test, feature = "test-support"))]
pub use sink::{CallbackCall, FakeSocket, RecordingCallback};
