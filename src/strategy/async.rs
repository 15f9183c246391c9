//! Asynchronous batch processing strategy
//!
//! Concurrent replay: operations are read in batches and every operation of
//! a batch runs concurrently against the shared ledger. The ledger's own
//! locking keeps the result consistent; it is not the same result as a
//! file-order replay unless the operations within each batch commute.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, max_concurrent_batches)
//!     ├── AsyncReader (batch CSV reading)
//!     └── BatchProcessor (spawn_blocking per operation)
//!         └── Arc<Ledger>
//! ```
//!
//! Batches are processed one after another: nothing from batch N+1 starts
//! before every operation of batch N has finished.

use crate::core::{BatchProcessor, Ledger};
use crate::io::async_reader::AsyncReader;
use crate::strategy::{write_report, ProcessingStrategy};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// Configuration for batch processing
///
/// Controls how operations are batched and how many run at once.
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// Number of operations per batch
    pub batch_size: usize,
    /// Runtime worker threads, and the bound on operations in flight
    pub max_concurrent_batches: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent_batches: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig; zero values fall back to the defaults
    pub fn new(batch_size: usize, max_concurrent_batches: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            tracing::warn!(
                requested = batch_size,
                fallback = default.batch_size,
                "invalid batch_size, using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent_batches = if max_concurrent_batches == 0 {
            tracing::warn!(
                requested = max_concurrent_batches,
                fallback = default.max_concurrent_batches,
                "invalid max_concurrent_batches, using default"
            );
            default.max_concurrent_batches
        } else {
            max_concurrent_batches
        };

        Self {
            batch_size,
            max_concurrent_batches,
        }
    }
}

/// Asynchronous batch processing strategy
#[derive(Clone)]
pub struct AsyncProcessingStrategy {
    ledger: Arc<Ledger>,
    config: BatchConfig,
}

impl AsyncProcessingStrategy {
    /// Create a new AsyncProcessingStrategy over `ledger`
    pub fn new(ledger: Arc<Ledger>, config: BatchConfig) -> Self {
        Self { ledger, config }
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    /// Replay the file batch by batch and write the report
    ///
    /// 1. Creates a tokio multi-threaded runtime
    /// 2. Reads operations in batches using AsyncReader
    /// 3. Runs each batch to completion through the BatchProcessor
    /// 4. Writes the account report
    ///
    /// Fatal errors (file not found, runtime errors) are returned immediately.
    /// Rejected operations are logged and processing continues.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent_batches)
            .build()
            .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

        runtime.block_on(async {
            let processor = BatchProcessor::new(
                Arc::clone(&self.ledger),
                self.config.max_concurrent_batches,
            );

            let file = tokio::fs::File::open(input_path)
                .await
                .map_err(|e| format!("Failed to open file '{}': {}", input_path.display(), e))?;

            // csv-async reads futures::io, not tokio::io
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
            let mut reader = AsyncReader::new(compat_file);

            let mut batches = 0usize;
            loop {
                let batch = reader.read_batch(self.config.batch_size).await;
                if batch.is_empty() {
                    break;
                }

                let results = processor.process_batch(batch).await;
                batches += 1;

                for processed in &results {
                    if let Err(e) = &processed.result {
                        tracing::debug!(
                            kind = %processed.operation.kind(),
                            error = %e,
                            "operation failed"
                        );
                    }
                }
            }
            tracing::debug!(batches, "replay finished");

            write_report(&self.ledger, output)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LedgerConfig, MerchCatalog};
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper function to create a temporary CSV file for testing
    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    fn ledger() -> Arc<Ledger> {
        Arc::new(Ledger::new(
            LedgerConfig::default(),
            Arc::new(MerchCatalog::default()),
        ))
    }

    #[test]
    fn test_batch_config_zero_falls_back_to_default() {
        let config = BatchConfig::new(0, 0);
        let default = BatchConfig::default();

        assert_eq!(config.batch_size, default.batch_size);
        assert_eq!(config.max_concurrent_batches, default.max_concurrent_batches);
    }

    #[test]
    fn test_async_strategy_opens_and_transfers() {
        // opens land in the first batch, transfers in the later ones
        let file = create_temp_csv(
            "op,user,target,amount\n\
             open,alice,,\n\
             open,bob,,\n\
             transfer,alice,bob,10\n\
             transfer,bob,alice,3\n\
             transfer,alice,bob,10\n\
             transfer,bob,alice,3\n",
        );
        let strategy = AsyncProcessingStrategy::new(ledger(), BatchConfig::new(2, 4));
        let mut output = Vec::new();

        strategy.process(file.path(), &mut output).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "user,balance,inventory,sent,received\n\
             alice,986,,20,6\n\
             bob,1014,,6,20\n"
        );
    }

    #[test]
    fn test_async_strategy_conserves_coins_under_contention() {
        let mut csv_content = String::from("op,user,target,amount\n");
        for name in ["a", "b", "c", "d"] {
            csv_content.push_str(&format!("open,{},,\n", name));
        }
        let names = ["a", "b", "c", "d"];
        for i in 0..400 {
            let from = names[i % 4];
            let to = names[(i * 7 + 1) % 4];
            csv_content.push_str(&format!("transfer,{},{},{}\n", from, to, i % 50 + 1));
        }
        let file = create_temp_csv(&csv_content);
        let ledger = ledger();
        let strategy = AsyncProcessingStrategy::new(Arc::clone(&ledger), BatchConfig::new(4, 4));
        let mut output = Vec::new();

        strategy.process(file.path(), &mut output).unwrap();

        assert_eq!(ledger.total_coins().unwrap(), 4000);
        assert!(ledger.snapshots().unwrap().iter().all(|s| s.balance >= 0));
    }

    #[test]
    fn test_async_strategy_handles_missing_file() {
        let strategy = AsyncProcessingStrategy::new(ledger(), BatchConfig::default());
        let mut output = Vec::new();

        let result = strategy.process(Path::new("nonexistent.csv"), &mut output);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Failed to open file"));
    }
}
