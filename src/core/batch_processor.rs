//! Concurrent dispatch of operation batches
//!
//! This module provides the `BatchProcessor` struct, which runs every
//! operation of a batch as its own blocking task on the tokio runtime.
//!
//! # Design
//!
//! Operations are not ordered against each other within a batch: the ledger
//! itself serializes whatever touches the same account and lets the rest run
//! in parallel. Batches are
//! still processed one after another, so an operation never races with one
//! from a later batch.
//!
//! Ledger calls may block on account locks, so they run on
//! `spawn_blocking` threads rather than the async workers.
//!
//! # Architecture
//!
//! ```text
//! BatchProcessor
//!     ├── Arc<Ledger>     (shared ledger)
//!     └── max_in_flight   (bound on concurrently running operations)
//! ```

use std::sync::Arc;

use futures::stream::{self, StreamExt};

use crate::core::ledger::{Applied, Ledger};
use crate::types::{LedgerError, Operation};

/// Result of processing a single operation
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    /// The operation that was processed
    pub operation: Operation,

    /// The result of processing (success or error)
    pub result: Result<Applied, LedgerError>,
}

/// Runs batches of operations concurrently against a shared ledger
#[derive(Clone)]
pub struct BatchProcessor {
    ledger: Arc<Ledger>,
    max_in_flight: usize,
}

impl BatchProcessor {
    /// Create a new BatchProcessor
    ///
    /// # Arguments
    ///
    /// * `ledger` - Shared ledger the operations are applied to
    /// * `max_in_flight` - Maximum number of operations running at once (at least 1)
    pub fn new(ledger: Arc<Ledger>, max_in_flight: usize) -> Self {
        Self {
            ledger,
            max_in_flight: max_in_flight.max(1),
        }
    }

    /// Process a batch of operations concurrently
    ///
    /// # Returns
    ///
    /// A vector of `ProcessingResult`, one per operation that ran to completion,
    /// in completion order (not input order).
    ///
    /// # Guarantees
    ///
    /// - Every operation is attempted, even if others fail
    /// - Errors are captured in results and don't stop processing
    /// - The future completes only once every operation of the batch is done
    pub async fn process_batch(&self, batch: Vec<Operation>) -> Vec<ProcessingResult> {
        let tasks = batch.into_iter().map(|operation| {
            let ledger = Arc::clone(&self.ledger);
            tokio::task::spawn_blocking(move || {
                let result = ledger.apply(operation.clone());
                ProcessingResult { operation, result }
            })
        });

        let joined: Vec<_> = stream::iter(tasks)
            .buffer_unordered(self.max_in_flight)
            .collect()
            .await;

        let mut results = Vec::with_capacity(joined.len());
        for outcome in joined {
            match outcome {
                Ok(processed) => results.push(processed),
                Err(e) => tracing::error!(error = %e, "operation task panicked"),
            }
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::MerchCatalog;
    use crate::core::ledger::LedgerConfig;

    fn processor(max_in_flight: usize) -> (Arc<Ledger>, BatchProcessor) {
        let ledger = Arc::new(Ledger::new(
            LedgerConfig::default(),
            Arc::new(MerchCatalog::default()),
        ));
        let processor = BatchProcessor::new(Arc::clone(&ledger), max_in_flight);
        (ledger, processor)
    }

    fn transfer(from: &str, to: &str, amount: i64) -> Operation {
        Operation::Transfer {
            from: from.to_string(),
            to: to.to_string(),
            amount,
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_process_batch_applies_every_operation() {
        let (ledger, processor) = processor(8);
        ledger.open_account("alice").unwrap();
        ledger.open_account("bob").unwrap();

        let batch: Vec<Operation> = (0..100).map(|_| transfer("alice", "bob", 1)).collect();
        let results = processor.process_batch(batch).await;

        assert_eq!(results.len(), 100);
        assert!(results.iter().all(|r| r.result.is_ok()));
        assert_eq!(ledger.snapshot("alice").unwrap().balance, 900);
        assert_eq!(ledger.snapshot("bob").unwrap().balance, 1100);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_process_batch_captures_errors() {
        let (ledger, processor) = processor(4);
        ledger.open_account("alice").unwrap();

        let batch = vec![
            transfer("alice", "ghost", 1),
            transfer("alice", "alice", 1),
            Operation::Buy {
                username: "alice".to_string(),
                item: "cup".to_string(),
            },
        ];
        let results = processor.process_batch(batch).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results.iter().filter(|r| r.result.is_err()).count(), 2);
        assert_eq!(ledger.snapshot("alice").unwrap().balance, 980);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_zero_max_in_flight_is_clamped() {
        let (ledger, processor) = processor(0);

        let results = processor
            .process_batch(vec![Operation::Open {
                username: "alice".to_string(),
            }])
            .await;

        assert_eq!(results.len(), 1);
        assert!(ledger.registry().contains("alice"));
    }
}
