//! Durable mirrors for committed ledger changes
//!
//! The in-memory ledger is authoritative for readers. A [`DurableMirror`]
//! receives every commit while the affected account locks are still held,
//! so its order matches the in-memory order.
//!
//! - [`NoopMirror`] discards commits (pure in-memory ledger).
//! - [`CsvJournal`] appends one CSV row per commit to any writer and flushes
//!   it, so each transfer (both balances plus the history entry) lands in a
//!   single write.
//!
//! What happens to the in-memory change when the mirror fails is decided by
//! [`MirrorFailurePolicy`].

use crate::core::traits::{DurableMirror, PurchaseCommit, TransferCommit};
use crate::types::{Coins, LedgerError, MirrorError};
use parking_lot::Mutex;
use serde::Serialize;
use std::io::Write;

/// What to do with an in-memory commit the mirror failed to persist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MirrorFailurePolicy {
    /// Keep the change; report `InternalStoreError { applied: true }`
    #[default]
    KeepInMemory,
    /// Undo the change before the locks are released; report
    /// `InternalStoreError { applied: false }`
    RollBack,
}

impl MirrorFailurePolicy {
    /// Turn a mirror outcome into the ledger result, rolling back if required
    ///
    /// Must be called with the account locks still held so that a rollback is
    /// never observable.
    pub(crate) fn settle<F>(self, outcome: Result<(), MirrorError>, rollback: F) -> Result<(), LedgerError>
    where
        F: FnOnce(),
    {
        let error = match outcome {
            Ok(()) => return Ok(()),
            Err(error) => error,
        };

        let applied = match self {
            MirrorFailurePolicy::KeepInMemory => true,
            MirrorFailurePolicy::RollBack => {
                rollback();
                false
            }
        };

        tracing::warn!(error = %error, applied, "durable mirror rejected commit");
        Err(LedgerError::internal_store(error.to_string(), applied))
    }
}

/// Mirror that persists nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMirror;

impl DurableMirror for NoopMirror {
    fn record_transfer(&self, _commit: &TransferCommit) -> Result<(), MirrorError> {
        Ok(())
    }

    fn record_purchase(&self, _commit: &PurchaseCommit) -> Result<(), MirrorError> {
        Ok(())
    }
}

/// One journal line
#[derive(Debug, Serialize)]
struct JournalRow<'a> {
    kind: &'static str,
    user: &'a str,
    target: &'a str,
    amount: Coins,
    user_balance: Coins,
    target_balance: Option<Coins>,
}

/// Append-only CSV journal of commits
///
/// Columns: `kind,user,target,amount,user_balance,target_balance`. For a
/// transfer `user` is the sender and `target` the recipient; for a purchase
/// `target` is the item and `target_balance` is empty.
pub struct CsvJournal<W: Write> {
    writer: Mutex<csv::Writer<W>>,
}

impl<W: Write> CsvJournal<W> {
    /// Create a journal writing to `output`
    pub fn new(output: W) -> Self {
        Self {
            writer: Mutex::new(csv::Writer::from_writer(output)),
        }
    }

    /// Flush and return the underlying writer
    pub fn into_inner(self) -> Result<W, MirrorError> {
        self.writer
            .into_inner()
            .into_inner()
            .map_err(|e| MirrorError::Io(e.into_error()))
    }

    fn append(&self, row: &JournalRow<'_>) -> Result<(), MirrorError> {
        let mut writer = self.writer.lock();
        writer.serialize(row)?;
        writer.flush()?;
        Ok(())
    }
}

impl<W: Write + Send> DurableMirror for CsvJournal<W> {
    fn record_transfer(&self, commit: &TransferCommit) -> Result<(), MirrorError> {
        self.append(&JournalRow {
            kind: "transfer",
            user: &commit.sender,
            target: &commit.recipient,
            amount: commit.amount,
            user_balance: commit.sender_balance,
            target_balance: Some(commit.recipient_balance),
        })
    }

    fn record_purchase(&self, commit: &PurchaseCommit) -> Result<(), MirrorError> {
        self.append(&JournalRow {
            kind: "buy",
            user: &commit.buyer,
            target: &commit.item,
            amount: commit.price,
            user_balance: commit.buyer_balance,
            target_balance: None,
        })
    }
}

/// Mirror that rejects every commit
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct FailingMirror;

#[cfg(test)]
impl DurableMirror for FailingMirror {
    fn record_transfer(&self, _commit: &TransferCommit) -> Result<(), MirrorError> {
        Err(MirrorError::Rejected("store offline".to_string()))
    }

    fn record_purchase(&self, _commit: &PurchaseCommit) -> Result<(), MirrorError> {
        Err(MirrorError::Rejected("store offline".to_string()))
    }
}
