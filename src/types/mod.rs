//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: history records and account snapshots
//! - `operation`: ledger operations and identifiers
//! - `error`: Error types for the ledger

pub mod account;
pub mod error;
pub mod operation;

pub use account::{AccountSnapshot, InventoryItem, PurchaseRecord, TransferRecord};
pub use error::{LedgerError, MirrorError};
pub use operation::{Coins, Operation, OperationKind, Username};
