//! Atomic catalog purchases
//!
//! `PurchaseEngine` debits one account for a catalog item's price and
//! records the purchase under that account's lock. Only one account is
//! involved, so no lock ordering is needed.

use crate::core::account::Account;
use crate::core::mirror::MirrorFailurePolicy;
use crate::core::traits::{Catalog, DurableMirror, PurchaseCommit};
use crate::types::{Coins, LedgerError};
use std::sync::Arc;
use std::time::Duration;

/// Result of a committed purchase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseReceipt {
    pub item: String,
    pub price: Coins,
    pub buyer_balance: Coins,
}

/// Debits accounts against a read-only catalog
pub struct PurchaseEngine {
    catalog: Arc<dyn Catalog>,
    lock_timeout: Option<Duration>,
    mirror: Arc<dyn DurableMirror>,
    mirror_failure: MirrorFailurePolicy,
}

impl PurchaseEngine {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        lock_timeout: Option<Duration>,
        mirror: Arc<dyn DurableMirror>,
        mirror_failure: MirrorFailurePolicy,
    ) -> Self {
        Self {
            catalog,
            lock_timeout,
            mirror,
            mirror_failure,
        }
    }

    /// Buy one `item_name` for `buyer`
    ///
    /// # Returns
    ///
    /// * `Ok(PurchaseReceipt)` - If the purchase committed
    /// * `Err(LedgerError::UnknownItem)` - If the catalog has no such item
    /// * `Err(LedgerError::InvalidPrice)` - If the catalog prices the item at zero or below
    /// * `Err(LedgerError::InsufficientFunds)` - If the balance under lock is below the price
    /// * `Err(LedgerError::LockTimeout)` - If the lock could not be acquired in time
    /// * `Err(LedgerError::InternalStoreError)` - If the mirror failed
    pub fn buy(&self, buyer: &Account, item_name: &str) -> Result<PurchaseReceipt, LedgerError> {
        let item = self
            .catalog
            .lookup(item_name)
            .ok_or_else(|| LedgerError::unknown_item(item_name))?;
        // Prices come from an arbitrary Catalog impl; only positive ones are debited.
        if item.price <= 0 {
            return Err(LedgerError::invalid_price(&item.name, item.price));
        }

        let mut account = buyer.lock(self.lock_timeout)?;

        if account.balance < item.price {
            return Err(LedgerError::insufficient_funds(
                account.username(),
                account.balance,
                item.price,
            ));
        }
        let remaining = account
            .balance
            .checked_sub(item.price)
            .ok_or_else(|| LedgerError::arithmetic_overflow("purchase", account.username()))?;

        let commit = PurchaseCommit {
            buyer: account.username().to_string(),
            item: item.name,
            price: item.price,
            buyer_balance: remaining,
        };

        account.balance = commit.buyer_balance;
        account.purchases.push(commit.record());

        let outcome = self.mirror.record_purchase(&commit);
        self.mirror_failure.settle(outcome, || {
            account.balance += commit.price;
            account.purchases.pop();
        })?;

        tracing::debug!(
            buyer = %commit.buyer,
            item = %commit.item,
            price = commit.price,
            "purchase committed"
        );

        Ok(PurchaseReceipt {
            item: commit.item,
            price: commit.price,
            buyer_balance: commit.buyer_balance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::MerchCatalog;
    use crate::core::mirror::{FailingMirror, NoopMirror};
    use crate::core::traits::Item;
    use rstest::rstest;
    use std::thread;

    fn engine() -> PurchaseEngine {
        PurchaseEngine::new(
            Arc::new(MerchCatalog::default()),
            None,
            Arc::new(NoopMirror),
            MirrorFailurePolicy::default(),
        )
    }

    #[test]
    fn test_buy_debits_and_records() {
        let alice = Account::new("alice".to_string(), 1000);

        let receipt = engine().buy(&alice, "t-shirt").unwrap();

        assert_eq!(
            receipt,
            PurchaseReceipt {
                item: "t-shirt".to_string(),
                price: 80,
                buyer_balance: 920
            }
        );
        let snapshot = alice.snapshot(None).unwrap();
        assert_eq!(snapshot.balance, 920);
        assert_eq!(snapshot.purchases.len(), 1);
        assert_eq!(snapshot.purchases[0].item, "t-shirt");
        assert_eq!(snapshot.purchases[0].price, 80);
    }

    #[test]
    fn test_buy_unknown_item() {
        let alice = Account::new("alice".to_string(), 1000);

        let result = engine().buy(&alice, "yacht");

        assert_eq!(result.unwrap_err(), LedgerError::unknown_item("yacht"));
        assert_eq!(alice.snapshot(None).unwrap().balance, 1000);
    }

    #[test]
    fn test_buy_insufficient_funds_changes_nothing() {
        let alice = Account::new("alice".to_string(), 50);

        let result = engine().buy(&alice, "t-shirt");

        assert_eq!(
            result.unwrap_err(),
            LedgerError::insufficient_funds("alice", 50, 80)
        );
        let snapshot = alice.snapshot(None).unwrap();
        assert_eq!(snapshot.balance, 50);
        assert!(snapshot.purchases.is_empty());
    }

    /// Catalog that hands out whatever price it was built with
    struct FixedPriceCatalog(Coins);

    impl Catalog for FixedPriceCatalog {
        fn lookup(&self, name: &str) -> Option<Item> {
            Some(Item {
                name: name.to_string(),
                price: self.0,
            })
        }
    }

    #[rstest]
    #[case::zero(0)]
    #[case::negative(-50)]
    #[case::minimum(Coins::MIN)]
    fn test_buy_rejects_non_positive_price(#[case] price: Coins) {
        let engine = PurchaseEngine::new(
            Arc::new(FixedPriceCatalog(price)),
            None,
            Arc::new(NoopMirror),
            MirrorFailurePolicy::default(),
        );
        let alice = Account::new("alice".to_string(), 1000);

        let error = engine.buy(&alice, "refund").unwrap_err();

        assert_eq!(error, LedgerError::invalid_price("refund", price));
        assert!(error.leaves_state_unchanged());
        let snapshot = alice.snapshot(None).unwrap();
        assert_eq!(snapshot.balance, 1000);
        assert!(snapshot.purchases.is_empty());
    }

    #[test]
    fn test_buy_exact_balance() {
        let alice = Account::new("alice".to_string(), 80);

        engine().buy(&alice, "t-shirt").unwrap();

        assert_eq!(alice.snapshot(None).unwrap().balance, 0);
    }

    #[test]
    fn test_buy_mirror_failure_rolls_back() {
        let engine = PurchaseEngine::new(
            Arc::new(MerchCatalog::default()),
            None,
            Arc::new(FailingMirror),
            MirrorFailurePolicy::RollBack,
        );
        let alice = Account::new("alice".to_string(), 1000);

        let error = engine.buy(&alice, "cup").unwrap_err();

        assert!(error.leaves_state_unchanged());
        let snapshot = alice.snapshot(None).unwrap();
        assert_eq!(snapshot.balance, 1000);
        assert!(snapshot.purchases.is_empty());
    }

    #[test]
    fn test_concurrent_purchases_never_overdraw() {
        let engine = Arc::new(engine());
        let alice = Arc::new(Account::new("alice".to_string(), 100));
        let mut handles = vec![];

        // 20 attempts at 10 coins each against 100 coins
        for _ in 0..20 {
            let engine = Arc::clone(&engine);
            let alice = Arc::clone(&alice);
            handles.push(thread::spawn(move || engine.buy(&alice, "pen").is_ok()));
        }

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        let snapshot = alice.snapshot(None).unwrap();
        assert_eq!(successes, 10);
        assert_eq!(snapshot.balance, 0);
        assert_eq!(snapshot.purchases.len(), 10);
    }
}
