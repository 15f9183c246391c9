//! Operation-related types for the coin ledger
//!
//! This module defines the identifiers shared across the crate and the
//! `Operation` enum that the replay pipelines feed into the ledger.

use std::fmt;

/// Account identity (unique, compared lexicographically for lock ordering)
pub type Username = String;

/// Coin amount. Balances never go below zero; signed so that callers can
/// hand in a negative amount and get `InvalidAmount` back instead of a
/// parse failure.
pub type Coins = i64;

/// Kind of ledger operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Resolve or create an account (the auth-time registration)
    Open,
    /// Move coins from one account to another
    Transfer,
    /// Spend coins on a catalog item
    Buy,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationKind::Open => "open",
            OperationKind::Transfer => "transfer",
            OperationKind::Buy => "buy",
        };
        f.write_str(name)
    }
}

/// A single ledger operation as issued by an already-authenticated caller
///
/// The acting username is always an explicit field; the ledger never looks
/// identity up from ambient context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Get-or-create `username` with the initial grant
    Open { username: Username },

    /// Move `amount` coins from `from` to `to`
    Transfer {
        from: Username,
        to: Username,
        amount: Coins,
    },

    /// Debit `username` for the catalog price of `item`
    Buy { username: Username, item: String },
}

impl Operation {
    /// The kind of this operation
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Open { .. } => OperationKind::Open,
            Operation::Transfer { .. } => OperationKind::Transfer,
            Operation::Buy { .. } => OperationKind::Buy,
        }
    }

    /// The username acting in this operation
    pub fn actor(&self) -> &str {
        match self {
            Operation::Open { username } => username,
            Operation::Transfer { from, .. } => from,
            Operation::Buy { username, .. } => username,
        }
    }
}
