//! Atomic coin transfers between two accounts
//!
//! This module provides the `TransferEngine`, which moves coins from a sender
//! to a recipient as a single step and appends matching history records.
//!
//! # Lock order
//!
//! A transfer holds both account locks while it mutates. To rule out circular
//! waits (A→B locking A then B while B→A locks B then A), locks are always
//! taken in ascending username order, whichever side is the sender. With
//! every transfer following the same total order, any number of concurrent
//! transfers among any accounts is deadlock-free.
//!
//! # Two-phase balance check
//!
//! 1. Advisory: the sender's published balance hint is read without locking
//!    and obviously unaffordable requests are rejected early.
//! 2. Authoritative: once both locks are held the balance is checked again;
//!    only this check decides whether the transfer commits.

use crate::core::account::{Account, AccountGuard};
use crate::core::mirror::MirrorFailurePolicy;
use crate::core::traits::{DurableMirror, TransferCommit};
use crate::types::{Coins, LedgerError};
use std::sync::Arc;
use std::time::Duration;

/// Result of a committed transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    pub amount: Coins,
    pub sender_balance: Coins,
    pub recipient_balance: Coins,
}

/// Moves coins between accounts with deadlock-free lock acquisition
pub struct TransferEngine {
    lock_timeout: Option<Duration>,
    mirror: Arc<dyn DurableMirror>,
    mirror_failure: MirrorFailurePolicy,
}

impl TransferEngine {
    /// Create a new TransferEngine
    ///
    /// # Arguments
    ///
    /// * `lock_timeout` - Bound on each lock acquisition (`None` waits forever)
    /// * `mirror` - Durable mirror notified of every commit
    /// * `mirror_failure` - What to do when the mirror fails
    pub fn new(
        lock_timeout: Option<Duration>,
        mirror: Arc<dyn DurableMirror>,
        mirror_failure: MirrorFailurePolicy,
    ) -> Self {
        Self {
            lock_timeout,
            mirror,
            mirror_failure,
        }
    }

    /// Transfer `amount` coins from `sender` to `recipient`
    ///
    /// This method processes a transfer by:
    /// 1. Validating the amount and target
    /// 2. Fast-rejecting on the sender's balance hint
    /// 3. Locking both accounts in username order
    /// 4. Re-validating the sender's balance under the locks
    /// 5. Debiting, crediting and appending one record on each side
    /// 6. Reporting the commit to the durable mirror
    ///
    /// # Returns
    ///
    /// * `Ok(TransferReceipt)` - If the transfer committed
    /// * `Err(LedgerError::InvalidAmount)` - If `amount <= 0`
    /// * `Err(LedgerError::InvalidTarget)` - If sender and recipient are the same account
    /// * `Err(LedgerError::InsufficientFunds)` - If the sender cannot cover `amount`
    /// * `Err(LedgerError::ArithmeticOverflow)` - If the credit would overflow
    /// * `Err(LedgerError::LockTimeout)` - If a lock could not be acquired in time
    /// * `Err(LedgerError::InternalStoreError)` - If the mirror failed
    pub fn transfer(
        &self,
        sender: &Account,
        recipient: &Account,
        amount: Coins,
    ) -> Result<TransferReceipt, LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::invalid_amount(amount));
        }
        if sender.username() == recipient.username() {
            return Err(LedgerError::invalid_target(recipient.username()));
        }

        let hint = sender.balance_hint();
        if hint < amount {
            tracing::debug!(
                sender = sender.username(),
                hint,
                amount,
                "transfer fast-rejected on balance hint"
            );
            return Err(LedgerError::insufficient_funds(sender.username(), hint, amount));
        }

        let (mut from, mut to) = self.lock_pair(sender, recipient)?;

        if from.balance < amount {
            return Err(LedgerError::insufficient_funds(
                sender.username(),
                from.balance,
                amount,
            ));
        }
        let credited = to
            .balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow("transfer", recipient.username()))?;

        let commit = TransferCommit {
            sender: sender.username().to_string(),
            recipient: recipient.username().to_string(),
            amount,
            sender_balance: from.balance - amount,
            recipient_balance: credited,
        };

        from.balance = commit.sender_balance;
        to.balance = commit.recipient_balance;
        from.outgoing.push(commit.outgoing_record());
        to.incoming.push(commit.incoming_record());

        let outcome = self.mirror.record_transfer(&commit);
        self.mirror_failure.settle(outcome, || {
            from.balance += amount;
            to.balance -= amount;
            from.outgoing.pop();
            to.incoming.pop();
        })?;

        tracing::debug!(
            sender = %commit.sender,
            recipient = %commit.recipient,
            amount,
            "transfer committed"
        );

        Ok(TransferReceipt {
            amount,
            sender_balance: commit.sender_balance,
            recipient_balance: commit.recipient_balance,
        })
    }

    /// Lock two distinct accounts in ascending username order
    ///
    /// Guards are returned as `(sender, recipient)` regardless of which was
    /// locked first. If the second lock times out, the first is released.
    fn lock_pair<'a>(
        &self,
        sender: &'a Account,
        recipient: &'a Account,
    ) -> Result<(AccountGuard<'a>, AccountGuard<'a>), LedgerError> {
        if sender.username() < recipient.username() {
            let from = sender.lock(self.lock_timeout)?;
            let to = recipient.lock(self.lock_timeout)?;
            Ok((from, to))
        } else {
            let to = recipient.lock(self.lock_timeout)?;
            let from = sender.lock(self.lock_timeout)?;
            Ok((from, to))
        }
    }
}
