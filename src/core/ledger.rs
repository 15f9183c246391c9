//! Ledger facade
//!
//! This module provides the `Ledger`, which ties the `AccountRegistry`,
//! `TransferEngine` and `PurchaseEngine` together behind username-based
//! operations.
//!
//! # Architecture
//!
//! ```text
//! Ledger
//!     ├── AccountRegistry       (username → Arc<Account>)
//!     ├── TransferEngine        (ordered two-account locking)
//!     └── PurchaseEngine        (single-account locking, read-only Catalog)
//! ```
//!
//! Usernames are resolved through the registry first; the registry is never
//! held while an engine waits on an account lock.

use crate::core::account::Account;
use crate::core::mirror::{MirrorFailurePolicy, NoopMirror};
use crate::core::purchase::{PurchaseEngine, PurchaseReceipt};
use crate::core::registry::AccountRegistry;
use crate::core::traits::{Catalog, DurableMirror};
use crate::core::transfer::{TransferEngine, TransferReceipt};
use crate::types::{AccountSnapshot, Coins, LedgerError, Operation};
use std::sync::Arc;
use std::time::Duration;

/// Ledger configuration
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerConfig {
    /// Coins granted to every new account
    pub initial_grant: Coins,
    /// Bound on each account lock acquisition (`None` waits forever)
    pub lock_timeout: Option<Duration>,
    /// Create unknown recipients on transfer instead of failing `UserNotFound`
    pub auto_create_recipients: bool,
    /// What to do with an in-memory commit the mirror failed to persist
    pub mirror_failure: MirrorFailurePolicy,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            initial_grant: 1000,
            lock_timeout: Some(Duration::from_secs(5)),
            auto_create_recipients: false,
            mirror_failure: MirrorFailurePolicy::default(),
        }
    }
}

/// Outcome of a successfully applied [`Operation`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    Opened { balance: Coins },
    Transferred(TransferReceipt),
    Bought(PurchaseReceipt),
}

/// Registry plus transfer and purchase engines
pub struct Ledger {
    registry: AccountRegistry,
    transfers: TransferEngine,
    purchases: PurchaseEngine,
    config: LedgerConfig,
}

impl Ledger {
    /// Create an in-memory ledger with no durable mirror
    pub fn new(config: LedgerConfig, catalog: Arc<dyn Catalog>) -> Self {
        Self::with_mirror(config, catalog, Arc::new(NoopMirror))
    }

    /// Create a ledger that reports every commit to `mirror`
    pub fn with_mirror(
        config: LedgerConfig,
        catalog: Arc<dyn Catalog>,
        mirror: Arc<dyn DurableMirror>,
    ) -> Self {
        let registry = AccountRegistry::new(config.initial_grant);
        let transfers =
            TransferEngine::new(config.lock_timeout, Arc::clone(&mirror), config.mirror_failure);
        let purchases =
            PurchaseEngine::new(catalog, config.lock_timeout, mirror, config.mirror_failure);

        Self {
            registry,
            transfers,
            purchases,
            config,
        }
    }

    /// The configuration this ledger was built with
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// The account registry
    pub fn registry(&self) -> &AccountRegistry {
        &self.registry
    }

    /// Get or create the account for `username`
    pub fn open_account(&self, username: &str) -> Result<Arc<Account>, LedgerError> {
        self.registry.get_or_create(username)
    }

    /// Transfer `amount` coins from `sender` to `recipient`
    ///
    /// The sender must exist. The recipient must exist too unless
    /// `auto_create_recipients` is set.
    ///
    /// With auto-creation, the amount, the target and the sender's balance
    /// hint are checked before the recipient is created, so those rejections
    /// leave the registry untouched. A transfer that passes the hint but then
    /// loses the authoritative check under the lock keeps the new recipient:
    /// creation is a registry effect of its own, like `open_account`.
    pub fn transfer(
        &self,
        sender: &str,
        recipient: &str,
        amount: Coins,
    ) -> Result<TransferReceipt, LedgerError> {
        self.resolve_and_transfer(sender, recipient, amount)
            .inspect_err(|e| tracing::warn!(sender, recipient, amount, error = %e, "transfer rejected"))
    }

    fn resolve_and_transfer(
        &self,
        sender: &str,
        recipient: &str,
        amount: Coins,
    ) -> Result<TransferReceipt, LedgerError> {
        let from = self.registry.get(sender)?;
        let to = if self.config.auto_create_recipients {
            if amount <= 0 {
                return Err(LedgerError::invalid_amount(amount));
            }
            if sender == recipient {
                return Err(LedgerError::invalid_target(recipient));
            }
            let hint = from.balance_hint();
            if hint < amount {
                return Err(LedgerError::insufficient_funds(sender, hint, amount));
            }
            self.registry.get_or_create(recipient)?
        } else {
            self.registry.get(recipient)?
        };

        self.transfers.transfer(&from, &to, amount)
    }

    /// Buy one `item` for `buyer`
    pub fn buy(&self, buyer: &str, item: &str) -> Result<PurchaseReceipt, LedgerError> {
        let account = self.registry.get(buyer)?;

        self.purchases
            .buy(&account, item)
            .inspect_err(|e| tracing::warn!(buyer, item, error = %e, "purchase rejected"))
    }

    /// Consistent copy of one account's balance and histories
    pub fn snapshot(&self, username: &str) -> Result<AccountSnapshot, LedgerError> {
        self.registry.get(username)?.snapshot(self.config.lock_timeout)
    }

    /// Snapshots of every account, sorted by username
    ///
    /// Each snapshot is consistent on its own; the set is not taken at a
    /// single instant across accounts.
    pub fn snapshots(&self) -> Result<Vec<AccountSnapshot>, LedgerError> {
        self.registry
            .accounts()
            .iter()
            .map(|account| account.snapshot(self.config.lock_timeout))
            .collect()
    }

    /// Sum of all balances
    ///
    /// Only meaningful while no operations are in flight.
    pub fn total_coins(&self) -> Result<Coins, LedgerError> {
        Ok(self.snapshots()?.iter().map(|s| s.balance).sum())
    }

    /// Apply one operation
    pub fn apply(&self, operation: Operation) -> Result<Applied, LedgerError> {
        match operation {
            Operation::Open { username } => {
                let account = self.open_account(&username)?;
                let snapshot = account.snapshot(self.config.lock_timeout)?;
                Ok(Applied::Opened {
                    balance: snapshot.balance,
                })
            }
            Operation::Transfer { from, to, amount } => {
                self.transfer(&from, &to, amount).map(Applied::Transferred)
            }
            Operation::Buy { username, item } => self.buy(&username, &item).map(Applied::Bought),
        }
    }
}
