//! Account-related types for the coin ledger
//!
//! This module defines the history records appended by transfers and
//! purchases, and the immutable `AccountSnapshot` handed to readers.

use super::operation::{Coins, Username};
use std::collections::BTreeMap;

/// One side of a completed transfer
///
/// The direction is implied by the history list the record lives in:
/// in an outgoing list `counterparty` is the recipient, in an incoming
/// list it is the sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRecord {
    /// The other account involved in the transfer
    pub counterparty: Username,

    /// Coins moved (always positive)
    pub amount: Coins,
}

/// A completed purchase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseRecord {
    /// Catalog item name
    pub item: String,

    /// Price paid, equal to the catalog price at the time of purchase
    pub price: Coins,
}

/// Purchased items grouped by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryItem {
    pub item: String,
    pub quantity: usize,
}

/// Point-in-time copy of an account
///
/// Taken under the account lock, so the balance and all three histories
/// belong to the same instant. Owning its data, it stays valid while the
/// live account keeps changing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSnapshot {
    pub username: Username,
    pub balance: Coins,
    pub outgoing: Vec<TransferRecord>,
    pub incoming: Vec<TransferRecord>,
    pub purchases: Vec<PurchaseRecord>,
}

impl AccountSnapshot {
    /// Purchases aggregated by item, sorted by item name
    pub fn inventory(&self) -> Vec<InventoryItem> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for purchase in &self.purchases {
            *counts.entry(purchase.item.as_str()).or_default() += 1;
        }

        counts
            .into_iter()
            .map(|(item, quantity)| InventoryItem {
                item: item.to_string(),
                quantity,
            })
            .collect()
    }

    /// Total coins sent to other accounts
    pub fn sent_total(&self) -> Coins {
        self.outgoing.iter().map(|record| record.amount).sum()
    }

    /// Total coins received from other accounts
    pub fn received_total(&self) -> Coins {
        self.incoming.iter().map(|record| record.amount).sum()
    }

    /// Total coins spent on purchases
    pub fn spent_total(&self) -> Coins {
        self.purchases.iter().map(|record| record.price).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn purchase(item: &str, price: Coins) -> PurchaseRecord {
        PurchaseRecord {
            item: item.to_string(),
            price,
        }
    }

    fn transfer(counterparty: &str, amount: Coins) -> TransferRecord {
        TransferRecord {
            counterparty: counterparty.to_string(),
            amount,
        }
    }

    #[test]
    fn test_inventory_groups_and_sorts_items() {
        let snapshot = AccountSnapshot {
            username: "alice".to_string(),
            balance: 830,
            outgoing: vec![],
            incoming: vec![],
            purchases: vec![purchase("t-shirt", 80), purchase("cup", 20), purchase("t-shirt", 80)],
        };

        let inventory = snapshot.inventory();

        assert_eq!(
            inventory,
            vec![
                InventoryItem { item: "cup".to_string(), quantity: 1 },
                InventoryItem { item: "t-shirt".to_string(), quantity: 2 },
            ]
        );
        assert_eq!(snapshot.spent_total(), 180);
    }

    #[test]
    fn test_transfer_totals() {
        let snapshot = AccountSnapshot {
            username: "bob".to_string(),
            balance: 1000,
            outgoing: vec![transfer("alice", 30), transfer("carol", 20)],
            incoming: vec![transfer("alice", 50)],
            purchases: vec![],
        };

        assert_eq!(snapshot.sent_total(), 50);
        assert_eq!(snapshot.received_total(), 50);
        assert!(snapshot.inventory().is_empty());
    }
}
