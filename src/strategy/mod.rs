//! Replay strategy module
//!
//! This module defines the Strategy pattern for complete replay pipelines,
//! encompassing both CSV parsing and applying operations to a ledger. This
//! allows different implementations (synchronous, asynchronous batch) to be
//! selected at runtime.

use crate::cli::StrategyType;
use crate::core::Ledger;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use sync::SyncProcessingStrategy;

/// Processing strategy trait for complete replay pipelines
///
/// Each strategy reads operations from a CSV file, applies them to its
/// ledger, and writes the resulting account report to output.
pub trait ProcessingStrategy: Send + Sync {
    /// Replay operations from `input_path` and write the account report
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the replay completed (individual operations may have failed)
    /// * `Err(String)` if a fatal error occurred (file not found, I/O error, etc.)
    ///
    /// Individual operation failures are logged and do not stop the replay.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String>;
}

/// Create a processing strategy based on the specified strategy type
///
/// # Arguments
///
/// * `strategy_type` - The type of processing strategy to create (Sync or Async)
/// * `ledger` - Ledger the operations are applied to
/// * `config` - Optional configuration for async batch processing (ignored for sync)
pub fn create_strategy(
    strategy_type: StrategyType,
    ledger: Arc<Ledger>,
    config: Option<BatchConfig>,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy::new(ledger)),
        StrategyType::Async => {
            let config = config.unwrap_or_default();
            Box::new(AsyncProcessingStrategy::new(ledger, config))
        }
    }
}

/// Write the report for every account in `ledger`
pub(crate) fn write_report(ledger: &Ledger, output: &mut dyn Write) -> Result<(), String> {
    let snapshots = ledger
        .snapshots()
        .map_err(|e| format!("Failed to snapshot accounts: {}", e))?;
    crate::io::csv_format::write_accounts_csv(&snapshots, output)
}
