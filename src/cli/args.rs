use crate::core::{LedgerConfig, MirrorFailurePolicy};
use crate::strategy::BatchConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// Replay coin ledger operations and report account balances
#[derive(Parser, Debug)]
#[command(name = "coin-ledger")]
#[command(about = "Replay coin transfers and merch purchases against a concurrent ledger", long_about = None)]
pub struct CliArgs {
    /// Input CSV file path containing operations
    #[arg(value_name = "INPUT", help = "Path to the input CSV file")]
    pub input_file: PathBuf,

    /// Replay strategy
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "sync",
        help = "Replay strategy: 'sync' applies in file order, 'async' runs each batch concurrently"
    )]
    pub strategy: StrategyType,

    /// Number of operations per batch (async mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of operations per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Maximum number of concurrent operations (async mode only)
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Worker threads and operations in flight (default: CPU cores)"
    )]
    pub max_concurrent_batches: Option<usize>,

    /// Coins granted to each new account
    #[arg(
        long = "initial-grant",
        value_name = "COINS",
        default_value_t = 1000,
        value_parser = clap::value_parser!(i64).range(0..)
    )]
    pub initial_grant: i64,

    /// Bound on each account lock acquisition; 0 waits forever
    #[arg(long = "lock-timeout-ms", value_name = "MS", default_value_t = 5000)]
    pub lock_timeout_ms: u64,

    /// Create unknown transfer recipients instead of rejecting the transfer
    #[arg(long = "auto-create-recipients")]
    pub auto_create_recipients: bool,

    /// Undo in-memory commits the journal failed to record
    #[arg(long = "rollback-on-journal-failure")]
    pub rollback_on_journal_failure: bool,

    /// Catalog CSV (`name,price`); the standard merch list when omitted
    #[arg(long = "catalog", value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// Write one CSV row per committed operation to this file (truncated first)
    #[arg(long = "journal", value_name = "FILE")]
    pub journal: Option<PathBuf>,
}

/// Available replay strategies
#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

impl CliArgs {
    /// Create a BatchConfig from CLI arguments
    ///
    /// Uses the provided values or falls back to the defaults; zero values are
    /// replaced by the defaults with a warning.
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_some() || self.max_concurrent_batches.is_some() {
            let default = BatchConfig::default();
            BatchConfig::new(
                self.batch_size.unwrap_or(default.batch_size),
                self.max_concurrent_batches
                    .unwrap_or(default.max_concurrent_batches),
            )
        } else {
            BatchConfig::default()
        }
    }

    /// Create a LedgerConfig from CLI arguments
    pub fn to_ledger_config(&self) -> LedgerConfig {
        LedgerConfig {
            initial_grant: self.initial_grant,
            lock_timeout: (self.lock_timeout_ms > 0)
                .then(|| Duration::from_millis(self.lock_timeout_ms)),
            auto_create_recipients: self.auto_create_recipients,
            mirror_failure: if self.rollback_on_journal_failure {
                MirrorFailurePolicy::RollBack
            } else {
                MirrorFailurePolicy::KeepInMemory
            },
        }
    }
}
