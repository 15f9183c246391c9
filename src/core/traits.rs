//! Collaborator traits for the ledger
//!
//! The ledger consults a read-only catalog for prices and reports every
//! committed change to a durable mirror. Both are trait objects so that
//! callers can plug in their own shop table or persistence layer.

use crate::types::{Coins, MirrorError, PurchaseRecord, TransferRecord, Username};

/// A purchasable catalog entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub name: String,
    pub price: Coins,
}

/// Read-only item table
///
/// The ledger only ever calls `lookup`; it never mutates a catalog.
pub trait Catalog: Send + Sync {
    /// Find an item by name
    fn lookup(&self, name: &str) -> Option<Item>;
}

/// A committed transfer as seen by the durable mirror
///
/// Carries both sides' resulting balances and the history entry, so a mirror
/// can persist the whole unit with a single atomic write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferCommit {
    pub sender: Username,
    pub recipient: Username,
    pub amount: Coins,
    pub sender_balance: Coins,
    pub recipient_balance: Coins,
}

impl TransferCommit {
    /// The record appended to the sender's outgoing history
    pub fn outgoing_record(&self) -> TransferRecord {
        TransferRecord {
            counterparty: self.recipient.clone(),
            amount: self.amount,
        }
    }

    /// The record appended to the recipient's incoming history
    pub fn incoming_record(&self) -> TransferRecord {
        TransferRecord {
            counterparty: self.sender.clone(),
            amount: self.amount,
        }
    }
}

/// A committed purchase as seen by the durable mirror
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseCommit {
    pub buyer: Username,
    pub item: String,
    pub price: Coins,
    pub buyer_balance: Coins,
}

impl PurchaseCommit {
    /// The record appended to the buyer's purchase history
    pub fn record(&self) -> PurchaseRecord {
        PurchaseRecord {
            item: self.item.clone(),
            price: self.price,
        }
    }
}

/// Durable copy of committed ledger changes
///
/// Called while the affected account locks are held, in commit order. Each
/// call must persist its commit atomically: all of it or none of it.
pub trait DurableMirror: Send + Sync {
    /// Persist a committed transfer
    fn record_transfer(&self, commit: &TransferCommit) -> Result<(), MirrorError>;

    /// Persist a committed purchase
    fn record_purchase(&self, commit: &PurchaseCommit) -> Result<(), MirrorError>;
}
