//! Error types for the coin ledger
//!
//! This module defines all error types that ledger operations can return.
//!
//! # Error Categories
//!
//! - **Validation Errors**: bad usernames, amounts, prices or targets, unknown users/items.
//!   Detected before or under the lock; nothing has changed.
//! - **Balance Errors**: insufficient funds, arithmetic overflow. Decided under
//!   the lock; nothing has changed.
//! - **Lock Errors**: lock acquisition timed out; nothing has changed.
//! - **Store Errors**: the durable mirror failed after the in-memory commit.
//!   Whether the in-memory change stayed applied is carried in the error.

use super::operation::{Coins, Username};
use thiserror::Error;

/// Main error type for the ledger
///
/// Every variant except `InternalStoreError { applied: true, .. }` means the
/// ledger state is exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Username is empty or whitespace-only
    #[error("Invalid username '{username}'")]
    InvalidUsername {
        /// The rejected username
        username: String,
    },

    /// No account is registered for the username
    #[error("User '{username}' not found")]
    UserNotFound {
        /// The username that was looked up
        username: Username,
    },

    /// Item is not in the catalog
    #[error("Unknown item '{item}'")]
    UnknownItem {
        /// The requested item name
        item: String,
    },

    /// Catalog item carries a zero or negative price
    #[error("Invalid price {price} for item '{item}': must be a positive number of coins")]
    InvalidPrice {
        /// The offending item
        item: String,
        /// The rejected price
        price: Coins,
    },

    /// Transfer amount is zero or negative
    #[error("Invalid amount {amount}: must be a positive number of coins")]
    InvalidAmount {
        /// The rejected amount
        amount: Coins,
    },

    /// Transfer target is not a valid recipient (sender == recipient)
    #[error("Invalid transfer target '{username}': cannot transfer to self")]
    InvalidTarget {
        /// The rejected recipient
        username: Username,
    },

    /// Balance too low for the requested debit
    #[error("Insufficient funds for '{username}': balance {balance}, requested {requested}")]
    InsufficientFunds {
        /// Account that would be debited
        username: Username,
        /// Balance observed when the request was rejected
        balance: Coins,
        /// Requested debit
        requested: Coins,
    },

    /// Arithmetic overflow would occur
    #[error("Arithmetic overflow in {operation} for '{username}'")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Account whose balance would overflow
        username: Username,
    },

    /// Account lock could not be acquired in time
    #[error("Timed out after {waited_ms}ms waiting for the lock on '{username}'")]
    LockTimeout {
        /// Account whose lock was contended
        username: Username,
        /// Configured wait bound in milliseconds
        waited_ms: u64,
    },

    /// The durable mirror rejected a commit
    #[error(
        "Internal store error ({}): {message}",
        if *applied { "in-memory change applied" } else { "in-memory change rolled back" }
    )]
    InternalStoreError {
        /// Description of the mirror failure
        message: String,
        /// Whether the in-memory change is still in effect
        applied: bool,
    },
}

impl LedgerError {
    /// Create an InvalidUsername error
    pub fn invalid_username(username: &str) -> Self {
        LedgerError::InvalidUsername {
            username: username.to_string(),
        }
    }

    /// Create a UserNotFound error
    pub fn user_not_found(username: &str) -> Self {
        LedgerError::UserNotFound {
            username: username.to_string(),
        }
    }

    /// Create an UnknownItem error
    pub fn unknown_item(item: &str) -> Self {
        LedgerError::UnknownItem {
            item: item.to_string(),
        }
    }

    /// Create an InvalidPrice error
    pub fn invalid_price(item: &str, price: Coins) -> Self {
        LedgerError::InvalidPrice {
            item: item.to_string(),
            price,
        }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: Coins) -> Self {
        LedgerError::InvalidAmount { amount }
    }

    /// Create an InvalidTarget error
    pub fn invalid_target(username: &str) -> Self {
        LedgerError::InvalidTarget {
            username: username.to_string(),
        }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(username: &str, balance: Coins, requested: Coins) -> Self {
        LedgerError::InsufficientFunds {
            username: username.to_string(),
            balance,
            requested,
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, username: &str) -> Self {
        LedgerError::ArithmeticOverflow {
            operation: operation.to_string(),
            username: username.to_string(),
        }
    }

    /// Create a LockTimeout error
    pub fn lock_timeout(username: &str, waited_ms: u64) -> Self {
        LedgerError::LockTimeout {
            username: username.to_string(),
            waited_ms,
        }
    }

    /// Create an InternalStoreError
    pub fn internal_store(message: impl Into<String>, applied: bool) -> Self {
        LedgerError::InternalStoreError {
            message: message.into(),
            applied,
        }
    }

    /// True when the failed call left every account exactly as it was
    ///
    /// Only a mirror failure whose in-memory change was kept returns false.
    pub fn leaves_state_unchanged(&self) -> bool {
        !matches!(self, LedgerError::InternalStoreError { applied: true, .. })
    }
}

/// Failure reported by a durable mirror
#[derive(Debug, Error)]
pub enum MirrorError {
    /// Underlying writer failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Record could not be serialized
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The mirror refused the commit
    #[error("Commit rejected: {0}")]
    Rejected(String),
}
