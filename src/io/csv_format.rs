//! CSV format handling for operation scripts and account reports
//!
//! This module centralizes all CSV format concerns, providing:
//! - CsvRecord structure for deserialization
//! - Conversion from CSV records to ledger operations
//! - Account report serialization
//!
//! All functions are pure (no I/O) for easy testing.
//!
//! # Input format
//!
//! ```text
//! op,user,target,amount
//! open,alice,,
//! transfer,alice,bob,100
//! buy,alice,t-shirt,
//! ```
//!
//! # Output format
//!
//! ```text
//! user,balance,inventory,sent,received
//! alice,820,t-shirt:1,100,0
//! ```

use crate::types::{AccountSnapshot, Coins, Operation};
use serde::Deserialize;
use std::io::Write;

/// CSV record structure for deserialization
///
/// Matches the input CSV format with columns: op, user, target, amount.
/// `target` is the recipient of a transfer or the item of a purchase;
/// `amount` is only used by transfers.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvRecord {
    pub op: String,
    pub user: String,
    pub target: Option<String>,
    pub amount: Option<String>,
}

/// Convert a CsvRecord to an Operation
///
/// This function:
/// - Parses the operation name (case-insensitive)
/// - Requires a target for transfers and purchases
/// - Parses the amount of a transfer as a whole number of coins
///
/// Amount *values* are not range-checked here: a zero or negative amount
/// is passed through so that the ledger rejects it with `InvalidAmount`.
///
/// # Returns
///
/// Result containing either:
/// - Ok(Operation) - Successfully converted record
/// - Err(String) - Error message describing the conversion failure
pub fn convert_csv_record(csv_record: CsvRecord) -> Result<Operation, String> {
    let target = csv_record
        .target
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    match csv_record.op.trim().to_lowercase().as_str() {
        "open" => Ok(Operation::Open {
            username: csv_record.user,
        }),
        "transfer" => {
            let to = target.ok_or_else(|| {
                format!("transfer by '{}' requires a target user", csv_record.user)
            })?;
            let amount = parse_amount(csv_record.amount.as_deref(), &csv_record.user)?;
            Ok(Operation::Transfer {
                from: csv_record.user,
                to,
                amount,
            })
        }
        "buy" => {
            let item = target
                .ok_or_else(|| format!("buy by '{}' requires an item", csv_record.user))?;
            Ok(Operation::Buy {
                username: csv_record.user,
                item,
            })
        }
        _ => Err(format!(
            "Invalid operation: '{}' for user '{}'",
            csv_record.op, csv_record.user
        )),
    }
}

fn parse_amount(amount: Option<&str>, user: &str) -> Result<Coins, String> {
    match amount.map(str::trim) {
        Some(raw) if !raw.is_empty() => raw
            .parse::<Coins>()
            .map_err(|_| format!("Invalid amount '{}' for transfer by '{}'", raw, user)),
        _ => Err(format!("transfer by '{}' requires an amount", user)),
    }
}

/// Render an inventory as `item:qty` pairs joined by `;`
fn format_inventory(snapshot: &AccountSnapshot) -> String {
    snapshot
        .inventory()
        .iter()
        .map(|entry| format!("{}:{}", entry.item, entry.quantity))
        .collect::<Vec<_>>()
        .join(";")
}

/// Write account snapshots to CSV format
///
/// Writes accounts in CSV format with columns: user, balance, inventory,
/// sent, received. Accounts are sorted by username for deterministic output.
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(String)` if a write error occurred
pub fn write_accounts_csv(
    snapshots: &[AccountSnapshot],
    output: &mut dyn Write,
) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record(["user", "balance", "inventory", "sent", "received"])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    let mut sorted: Vec<&AccountSnapshot> = snapshots.iter().collect();
    sorted.sort_by(|a, b| a.username.cmp(&b.username));

    for snapshot in sorted {
        writer
            .write_record(&[
                snapshot.username.clone(),
                snapshot.balance.to_string(),
                format_inventory(snapshot),
                snapshot.sent_total().to_string(),
                snapshot.received_total().to_string(),
            ])
            .map_err(|e| format!("Failed to write account record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}
