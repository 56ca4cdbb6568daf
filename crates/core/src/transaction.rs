// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transaction state machine for the close protocol
//!
//! Pure transitions only: the [`crate::closer::Closer`] executes the effects
//! and feeds their results back in as inputs.
//!
//! ```text
//! Open --Close--> Closing --LayersFinished--> Commit | Rollback
//!                         --LayersFailed----> Rollback
//!                         --CommitDone------> Committed
//!                         --CommitFailed----> Rollback
//!                         --RollbackDone----> RolledBack
//! ```

use crate::error::SaferError;

/// Lifecycle state of a transaction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxState {
    /// Accepting writes
    Open,
    /// Close in progress
    Closing,
    Committed,
    RolledBack,
}

impl TxState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TxState::Committed | TxState::RolledBack)
    }
}

/// Events that drive the transaction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxInput {
    /// The write scope failed
    Fail,
    /// Close was requested
    Close,
    /// All layers flushed down to the stage
    LayersFinished,
    /// Flushing the layers raised
    LayersFailed,
    CommitDone,
    CommitFailed,
    RollbackDone,
}

/// Work the closer must perform
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxEffect {
    /// Flush every stream layer and recover the raw stage
    FinishLayers,
    /// Make staged content the content of the target
    Commit,
    /// Discard staged content
    Rollback,
    /// Close the wrapped external sink, if requested
    CloseExternal { failed: bool },
}

/// How a handle was finalized
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Committed,
    RolledBack,
    /// The handle bypassed staging (read mode or disabled)
    Passthrough,
}

/// A single write transaction
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub state: TxState,
    pub failed: bool,
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}

impl Transaction {
    pub fn new() -> Self {
        Self {
            state: TxState::Open,
            failed: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state == TxState::Open
    }

    /// Final outcome, once terminal
    pub fn outcome(&self) -> Option<Outcome> {
        match self.state {
            TxState::Committed => Some(Outcome::Committed),
            TxState::RolledBack => Some(Outcome::RolledBack),
            TxState::Open | TxState::Closing => None,
        }
    }

    /// Pure state transition function
    pub fn transition(&self, input: TxInput) -> Result<(Transaction, Vec<TxEffect>), SaferError> {
        let mut next = self.clone();
        let mut effects = Vec::new();

        match (self.state, input) {
            (TxState::Open, TxInput::Fail) => {
                next.failed = true;
            }

            (TxState::Open, TxInput::Close) => {
                next.state = TxState::Closing;
                effects.push(TxEffect::FinishLayers);
            }

            (TxState::Closing, TxInput::LayersFinished) => {
                if self.failed {
                    effects.push(TxEffect::Rollback);
                } else {
                    effects.push(TxEffect::Commit);
                }
            }

            // Inner close or commit raised: force rollback
            (TxState::Closing, TxInput::LayersFailed | TxInput::CommitFailed) => {
                next.failed = true;
                effects.push(TxEffect::Rollback);
            }

            (TxState::Closing, TxInput::CommitDone) => {
                next.state = TxState::Committed;
                effects.push(TxEffect::CloseExternal { failed: false });
            }

            (TxState::Closing, TxInput::RollbackDone) => {
                next.state = TxState::RolledBack;
                effects.push(TxEffect::CloseExternal { failed: true });
            }

            // Closing twice is a no-op: rollback never runs again
            (TxState::Committed | TxState::RolledBack, TxInput::Close) => {}

            (TxState::Committed | TxState::RolledBack, _) => return Err(SaferError::AlreadyClosed),

            (state, input) => {
                return Err(SaferError::InvalidTransition(format!(
                    "{:?} on {:?}",
                    state, input
                )))
            }
        }

        Ok((next, effects))
    }
}

#[cfg(test)]
#[path = "transaction_tests.rs"]
mod tests;
