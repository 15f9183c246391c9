//! Synchronous processing strategy
//!
//! Single-threaded replay: operations are applied one at a time, in file
//! order, so the report is fully determined by the input.
//!
//! The SyncProcessingStrategy focuses on orchestration, delegating:
//! - CSV parsing to `SyncReader` (iterator interface)
//! - Business rules to `Ledger`
//! - CSV output to `csv_format::write_accounts_csv`

use crate::core::Ledger;
use crate::io::sync_reader::SyncReader;
use crate::strategy::{write_report, ProcessingStrategy};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// Synchronous processing strategy
///
/// # Examples
///
/// ```no_run
/// use coin_ledger::core::{Ledger, LedgerConfig, MerchCatalog};
/// use coin_ledger::strategy::{ProcessingStrategy, SyncProcessingStrategy};
/// use std::path::Path;
/// use std::sync::Arc;
///
/// let ledger = Arc::new(Ledger::new(LedgerConfig::default(), Arc::new(MerchCatalog::default())));
/// let strategy = SyncProcessingStrategy::new(ledger);
///
/// strategy.process(Path::new("operations.csv"), &mut std::io::stdout())
///     .expect("Processing failed");
/// ```
#[derive(Clone)]
pub struct SyncProcessingStrategy {
    ledger: Arc<Ledger>,
}

impl SyncProcessingStrategy {
    pub fn new(ledger: Arc<Ledger>) -> Self {
        Self { ledger }
    }
}

impl ProcessingStrategy for SyncProcessingStrategy {
    /// Replay the file in order and write the report
    ///
    /// Fatal errors (file not found, I/O errors) are returned immediately.
    /// Conversion errors and rejected operations are logged and skipped.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        let reader = SyncReader::new(input_path)?;

        for result in reader {
            match result {
                Ok(operation) => {
                    let kind = operation.kind();
                    if let Err(e) = self.ledger.apply(operation) {
                        tracing::debug!(%kind, error = %e, "operation failed");
                    }
                }
                Err(e) => tracing::warn!(error = %e, "skipping CSV record"),
            }
        }

        write_report(&self.ledger, output)
    }
}
