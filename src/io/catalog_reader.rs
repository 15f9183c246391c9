//! Catalog file loading
//!
//! Reads a `name,price` CSV into a [`MerchCatalog`]. Unlike operation
//! scripts, a bad catalog row is fatal: a shop with a silently missing item
//! would reject purchases for the wrong reason.

use crate::core::MerchCatalog;
use crate::types::Coins;
use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct CatalogRow {
    name: String,
    price: Coins,
}

/// Load a catalog from a CSV file with `name,price` columns
pub fn load_catalog(path: &Path) -> Result<MerchCatalog, String> {
    let file = File::open(path)
        .map_err(|e| format!("Failed to open catalog '{}': {}", path.display(), e))?;
    read_catalog(file)
}

/// Read a catalog from any `name,price` CSV source
///
/// Names must be non-blank and prices positive.
pub fn read_catalog<R: Read>(source: R) -> Result<MerchCatalog, String> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(source);
    let mut items = Vec::new();

    for (index, row) in reader.deserialize::<CatalogRow>().enumerate() {
        // +2 for the header row and 1-based numbering
        let line = index + 2;
        let row = row.map_err(|e| format!("Catalog line {}: {}", line, e))?;

        if row.name.is_empty() {
            return Err(format!("Catalog line {}: item name is empty", line));
        }
        if row.price <= 0 {
            return Err(format!(
                "Catalog line {}: price of '{}' must be positive, got {}",
                line, row.name, row.price
            ));
        }
        items.push((row.name, row.price));
    }

    tracing::info!(items = items.len(), "catalog loaded");
    MerchCatalog::from_items(items).map_err(|e| format!("Catalog: {}", e))
}
