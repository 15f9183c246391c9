//! Coin Ledger Library
//! # Overview
//!
//! A concurrent in-memory ledger for a merch shop's internal coin currency:
//! every account holds a coin balance, can transfer coins to other accounts
//! and can spend them on catalog items. Operation scripts can be replayed
//! from CSV with a sync or an async strategy.
//!
//! # Architecture
//!
//! - [`types`] - Plain data (Operation, AccountSnapshot, LedgerError, etc.)
//! - [`core`] - The ledger:
//!   - [`core::registry`] - Username to account map with get-or-create
//!   - [`core::transfer`] - Atomic two-account transfers with ordered locking
//!   - [`core::purchase`] - Atomic single-account purchases
//!   - [`core::mirror`] - Durable mirror hooks (no-op, CSV journal)
//!   - [`core::ledger`] - Facade tying the pieces together
//! - [`io`] - CSV operation scripts, account reports and catalog files
//! - [`strategy`] - Replay pipelines
//! - [`cli`] - CLI arguments parsing
//! - [`logging`] - Tracing subscriber setup
//!
//! # Guarantees
//!
//! - Balances never go negative
//! - Transfers conserve the total number of coins
//! - Concurrent operations on the same account never lose updates
//! - Locks are taken in a global order, so no set of operations can deadlock

pub mod cli;
pub mod core;
pub mod io;
pub mod logging;
pub mod strategy;
pub mod types;

pub use core::{Ledger, LedgerConfig, MerchCatalog};
pub use io::write_accounts_csv;
pub use types::{AccountSnapshot, Coins, LedgerError, Operation, Username};
