//! Merchandise catalog
//!
//! `MerchCatalog` is the read-only item table consulted by purchases. The
//! default instance holds the standard shop assortment; a custom table can be
//! built from `(name, price)` pairs or loaded from CSV (see
//! [`crate::io::catalog_reader`]).

use crate::core::traits::{Catalog, Item};
use crate::types::{Coins, LedgerError};
use std::collections::HashMap;

/// Standard shop assortment
const DEFAULT_ITEMS: [(&str, Coins); 10] = [
    ("t-shirt", 80),
    ("cup", 20),
    ("book", 50),
    ("pen", 10),
    ("powerbank", 200),
    ("hoody", 300),
    ("umbrella", 200),
    ("socks", 10),
    ("wallet", 50),
    ("pink-hoody", 500),
];

/// Immutable name → price table
#[derive(Debug, Clone, PartialEq)]
pub struct MerchCatalog {
    items: HashMap<String, Coins>,
}

impl MerchCatalog {
    /// Build a catalog from `(name, price)` pairs; later duplicates win
    ///
    /// Fails with `InvalidPrice` on the first item priced at zero or below.
    pub fn from_items<I, S>(items: I) -> Result<Self, LedgerError>
    where
        I: IntoIterator<Item = (S, Coins)>,
        S: Into<String>,
    {
        let mut table = HashMap::new();
        for (name, price) in items {
            let name = name.into();
            if price <= 0 {
                return Err(LedgerError::invalid_price(&name, price));
            }
            table.insert(name, price);
        }
        Ok(Self { items: table })
    }

    /// Number of items on offer
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the catalog offers nothing
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for MerchCatalog {
    fn default() -> Self {
        Self {
            items: DEFAULT_ITEMS
                .iter()
                .map(|&(name, price)| (name.to_string(), price))
                .collect(),
        }
    }
}

impl Catalog for MerchCatalog {
    fn lookup(&self, name: &str) -> Option<Item> {
        self.items.get(name).map(|&price| Item {
            name: name.to_string(),
            price,
        })
    }
}
