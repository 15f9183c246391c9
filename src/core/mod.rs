//! Core business logic module
//!
//! This module contains the ledger components:
//! - `account` - Lock-protected account entity and its guard
//! - `registry` - Username → account map with exactly-once creation
//! - `transfer` - Atomic two-account transfers with ordered locking
//! - `purchase` - Atomic single-account purchases
//! - `catalog` - Read-only merchandise table
//! - `mirror` - Durable mirrors and the mirror failure policy
//! - `traits` - Collaborator traits (catalog, durable mirror)
//! - `ledger` - Facade tying the above together
//! - `batch_processor` - Concurrent dispatch of operation batches

pub mod account;
pub mod batch_processor;
pub mod catalog;
pub mod ledger;
pub mod mirror;
pub mod purchase;
pub mod registry;
pub mod traits;
pub mod transfer;

pub use account::Account;
pub use batch_processor::{BatchProcessor, ProcessingResult};
pub use catalog::MerchCatalog;
pub use ledger::{Applied, Ledger, LedgerConfig};
pub use mirror::{CsvJournal, MirrorFailurePolicy, NoopMirror};
pub use purchase::{PurchaseEngine, PurchaseReceipt};
pub use registry::AccountRegistry;
pub use traits::{Catalog, DurableMirror, Item, PurchaseCommit, TransferCommit};
pub use transfer::{TransferEngine, TransferReceipt};
