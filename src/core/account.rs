//! Lock-protected account entity
//!
//! An `Account` owns one user's balance and history behind its own
//! `parking_lot::Mutex`. All mutation goes through an [`AccountGuard`],
//! which can only be obtained by locking the account.
//!
//! # Balance hint
//!
//! Besides the locked state, every account publishes its balance to an
//! atomic whenever a guard is released. Callers may read it without locking
//! to reject obviously unaffordable requests early. The hint may be stale the
//! moment it is read; the value behind the lock is the only one that decides.

use crate::types::{AccountSnapshot, Coins, LedgerError, PurchaseRecord, TransferRecord, Username};
use parking_lot::{Mutex, MutexGuard};
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

/// Mutable fields guarded by the account lock
#[derive(Debug)]
pub(crate) struct AccountState {
    /// Current balance, never negative
    pub(crate) balance: Coins,
    /// Transfers sent, oldest first
    pub(crate) outgoing: Vec<TransferRecord>,
    /// Transfers received, oldest first
    pub(crate) incoming: Vec<TransferRecord>,
    /// Purchases, oldest first
    pub(crate) purchases: Vec<PurchaseRecord>,
}

/// One user's balance and history, individually lock-protected
///
/// Accounts are created by the registry and shared as `Arc<Account>`; they
/// live for as long as the registry does.
#[derive(Debug)]
pub struct Account {
    username: Username,
    state: Mutex<AccountState>,
    balance_hint: AtomicI64,
}

impl Account {
    /// Create an account holding `initial_balance` coins and no history
    pub(crate) fn new(username: Username, initial_balance: Coins) -> Self {
        Account {
            username,
            state: Mutex::new(AccountState {
                balance: initial_balance,
                outgoing: Vec::new(),
                incoming: Vec::new(),
                purchases: Vec::new(),
            }),
            balance_hint: AtomicI64::new(initial_balance),
        }
    }

    /// The account's identity, also its position in the lock order
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Last balance published by a released guard
    ///
    /// Advisory only: use it for fast rejection, never for a decision that
    /// must hold at commit time.
    pub fn balance_hint(&self) -> Coins {
        self.balance_hint.load(Ordering::Acquire)
    }

    /// Acquire the account lock
    ///
    /// With `timeout = None` this waits indefinitely. Otherwise it fails with
    /// `LockTimeout` once the bound expires, without having changed anything.
    pub(crate) fn lock(&self, timeout: Option<Duration>) -> Result<AccountGuard<'_>, LedgerError> {
        let state = match timeout {
            None => self.state.lock(),
            Some(limit) => self.state.try_lock_for(limit).ok_or_else(|| {
                LedgerError::lock_timeout(&self.username, saturating_millis(limit))
            })?,
        };

        Ok(AccountGuard {
            account: self,
            state,
        })
    }

    /// Copy the balance and all histories under the lock
    ///
    /// The returned snapshot is independent of the account; the lock is held
    /// only for the duration of the copy.
    pub fn snapshot(&self, timeout: Option<Duration>) -> Result<AccountSnapshot, LedgerError> {
        let guard = self.lock(timeout)?;
        Ok(AccountSnapshot {
            username: self.username.clone(),
            balance: guard.balance,
            outgoing: guard.outgoing.clone(),
            incoming: guard.incoming.clone(),
            purchases: guard.purchases.clone(),
        })
    }
}

#[cfg(test)]
impl Account {
    /// Overwrite the published hint to simulate a stale read
    pub(crate) fn set_balance_hint(&self, value: Coins) {
        self.balance_hint.store(value, Ordering::Release);
    }
}

/// Exclusive access to an account's state
///
/// Dereferences to [`AccountState`]. Dropping the guard publishes the final
/// balance to the hint and then releases the lock.
pub(crate) struct AccountGuard<'a> {
    account: &'a Account,
    state: MutexGuard<'a, AccountState>,
}

impl AccountGuard<'_> {
    /// The account this guard locks
    pub(crate) fn username(&self) -> &str {
        &self.account.username
    }
}

impl Deref for AccountGuard<'_> {
    type Target = AccountState;

    fn deref(&self) -> &AccountState {
        &self.state
    }
}

impl DerefMut for AccountGuard<'_> {
    fn deref_mut(&mut self) -> &mut AccountState {
        &mut self.state
    }
}

impl Drop for AccountGuard<'_> {
    fn drop(&mut self) {
        // Runs before the MutexGuard field is dropped, so still under the lock.
        self.account
            .balance_hint
            .store(self.state.balance, Ordering::Release);
    }
}

/// Whole milliseconds in `limit`, clamped to `u64::MAX`
fn saturating_millis(limit: Duration) -> u64 {
    u64::try_from(limit.as_millis()).unwrap_or(u64::MAX)
}
