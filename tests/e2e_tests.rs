//! End-to-end integration tests
//!
//! These tests validate the complete replay pipeline using predefined CSV
//! fixtures. Each test:
//! 1. Reads input.csv from a fixture directory
//! 2. Replays every operation against a fresh ledger
//! 3. Generates the account report
//! 4. Compares it with expected.csv
//!
//! Fixtures are located in tests/fixtures/ and cover the happy path,
//! rejected operations, malformed rows and report formatting.
//!
//! Each fixture runs with both strategies. The async strategy runs with a
//! batch size of 1 so that its result is comparable to a file-order replay.

#[cfg(test)]
mod tests {
    use coin_ledger::cli::StrategyType;
    use coin_ledger::core::{CsvJournal, Ledger, LedgerConfig, MerchCatalog};
    use coin_ledger::strategy::{create_strategy, BatchConfig};
    use rstest::rstest;
    use std::fs;
    use std::io::Write;
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::NamedTempFile;

    fn default_ledger() -> Arc<Ledger> {
        Arc::new(Ledger::new(
            LedgerConfig::default(),
            Arc::new(MerchCatalog::default()),
        ))
    }

    fn batch_config(strategy_type: &StrategyType) -> Option<BatchConfig> {
        match strategy_type {
            StrategyType::Sync => None,
            StrategyType::Async => Some(BatchConfig::new(1, 4)),
        }
    }

    /// Replay `input` through `strategy_type` and return the report
    fn replay(input: &Path, strategy_type: StrategyType, ledger: Arc<Ledger>) -> String {
        let config = batch_config(&strategy_type);
        let strategy = create_strategy(strategy_type, ledger, config);
        let mut output = Vec::new();

        strategy
            .process(input, &mut output)
            .unwrap_or_else(|e| panic!("Failed to replay operations: {}", e));

        String::from_utf8(output).expect("report is not UTF-8")
    }

    /// Run a test fixture by replaying input.csv and comparing with expected.csv
    fn run_test_fixture(fixture_name: &str, strategy_type: StrategyType) {
        let fixture_dir = format!("tests/fixtures/{}", fixture_name);
        let input_path = format!("{}/input.csv", fixture_dir);
        let expected_path = format!("{}/expected.csv", fixture_dir);

        assert!(
            Path::new(&input_path).exists(),
            "Input file not found: {}",
            input_path
        );

        let actual_output = replay(Path::new(&input_path), strategy_type.clone(), default_ledger());

        let expected_output = fs::read_to_string(&expected_path)
            .unwrap_or_else(|e| panic!("Failed to read expected file {}: {}", expected_path, e));

        assert_eq!(
            actual_output, expected_output,
            "\n\nOutput mismatch for fixture: {} (strategy: {:?})\n\nActual output:\n{}\n\nExpected output:\n{}\n",
            fixture_name, strategy_type, actual_output, expected_output
        );
    }

    /// End-to-end test for all fixtures with both strategies
    #[rstest]
    #[case("happy_path")]
    #[case("insufficient_funds")]
    #[case("invalid_operations")]
    #[case("malformed_data")]
    #[case("inventory_aggregation")]
    #[case("transfer_chain")]
    #[case("whitespace_and_case")]
    #[case("repeated_open")]
    #[case("empty_input")]
    fn test_fixtures(
        #[case] fixture: &str,
        #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
    ) {
        run_test_fixture(fixture, strategy);
    }

    fn temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[rstest]
    fn test_auto_create_recipients(
        #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
    ) {
        let input = temp_csv("op,user,target,amount\nopen,alice,,\ntransfer,alice,newbie,10\n");
        let ledger = Arc::new(Ledger::new(
            LedgerConfig {
                auto_create_recipients: true,
                ..LedgerConfig::default()
            },
            Arc::new(MerchCatalog::default()),
        ));

        let output = replay(input.path(), strategy, ledger);

        assert_eq!(
            output,
            "user,balance,inventory,sent,received\n\
             alice,990,,10,0\n\
             newbie,1010,,0,10\n"
        );
    }

    #[test]
    fn test_custom_catalog_and_grant() {
        let input = temp_csv("op,user,target,amount\nopen,dana,,\nbuy,dana,sticker,\nbuy,dana,t-shirt,\n");
        let ledger = Arc::new(Ledger::new(
            LedgerConfig {
                initial_grant: 10,
                ..LedgerConfig::default()
            },
            Arc::new(MerchCatalog::from_items([("sticker", 3)]).unwrap()),
        ));

        let output = replay(input.path(), StrategyType::Sync, ledger);

        assert_eq!(
            output,
            "user,balance,inventory,sent,received\ndana,7,sticker:1,0,0\n"
        );
    }

    #[test]
    fn test_journal_records_committed_operations_only() {
        let input = Path::new("tests/fixtures/invalid_operations/input.csv");
        let journal = Arc::new(CsvJournal::new(Vec::new()));
        let ledger = Arc::new(Ledger::with_mirror(
            LedgerConfig::default(),
            Arc::new(MerchCatalog::default()),
            journal.clone(),
        ));

        replay(input, StrategyType::Sync, ledger);

        let journal = Arc::try_unwrap(journal)
            .ok()
            .expect("journal still shared");
        let written = String::from_utf8(journal.into_inner().unwrap()).unwrap();
        assert_eq!(
            written,
            "kind,user,target,amount,user_balance,target_balance\n\
             transfer,alice,bob,1,999,1001\n"
        );
    }
}
