//! Coin Ledger CLI
//!
//! Replays ledger operations from a CSV file and prints the resulting
//! account report.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- operations.csv > accounts.csv
//! cargo run -- --strategy async --batch-size 2000 --max-concurrent 8 operations.csv > accounts.csv
//! cargo run -- --catalog shop.csv --journal journal.csv operations.csv > accounts.csv
//! ```
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (file not found, bad catalog, unwritable journal, etc.)

use coin_ledger::cli::{self, CliArgs};
use coin_ledger::core::{CsvJournal, DurableMirror, Ledger, MerchCatalog, NoopMirror};
use coin_ledger::io::load_catalog;
use coin_ledger::{logging, strategy};
use std::fs::File;
use std::process;
use std::sync::Arc;

fn main() {
    logging::init();

    let args = cli::parse_args();

    if let Err(e) = run(&args) {
        tracing::error!("{}", e);
        process::exit(1);
    }
}

fn run(args: &CliArgs) -> Result<(), String> {
    let catalog = match &args.catalog {
        Some(path) => load_catalog(path)?,
        None => MerchCatalog::default(),
    };

    let mirror: Arc<dyn DurableMirror> = match &args.journal {
        Some(path) => {
            let file = File::create(path)
                .map_err(|e| format!("Failed to open journal '{}': {}", path.display(), e))?;
            Arc::new(CsvJournal::new(file))
        }
        None => Arc::new(NoopMirror),
    };

    let ledger = Arc::new(Ledger::with_mirror(
        args.to_ledger_config(),
        Arc::new(catalog),
        mirror,
    ));

    let config = matches!(args.strategy, cli::StrategyType::Async).then(|| args.to_batch_config());
    let strategy = strategy::create_strategy(args.strategy.clone(), ledger, config);

    let mut output = std::io::stdout();
    strategy.process(&args.input_file, &mut output)
}
