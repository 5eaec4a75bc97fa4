//! End-to-end integration tests
//!
//! These tests validate the complete scan-to-report pipeline using predefined
//! chain fixtures. Each fixture test:
//! 1. Loads chain.json from a fixture directory into an in-memory chain
//! 2. Runs the pipeline against it into a temporary output directory
//! 3. Compares the CSV export with expected.csv
//! 4. Checks the PDF report was written
//!
//! Test fixtures are located in tests/fixtures/ and cover:
//! - A deposit followed by a withdrawal
//! - Several outputs to the target in one transaction
//! - Blocks, block hashes and transactions the node fails to return
//! - Coinbase inputs, non-standard scripts and missing values
//!
//! The same fixtures are also served by a mock JSON-RPC node to exercise the
//! HTTP clients end to end.

#[cfg(test)]
mod tests {
    use address_ledger::core::{ChainScanner, ChainSource, LedgerBuilder, ReputationSource};
    use address_ledger::io::Settings;
    use address_ledger::pipeline::{run, run_with, ReportSummary, ReputationLookup};
    use address_ledger::report::FlowDiagram;
    use address_ledger::types::{
        AddressReputation, Block, Direction, RawTransaction, ReputationError, RpcError,
    };
    use rstest::rstest;
    use rust_decimal::Decimal;
    use serde::Deserialize;
    use serde_json::{json, Value};
    use std::cell::RefCell;
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::str::FromStr;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TARGET: &str = "bc1qtarget";

    /// In-memory chain loaded from a fixture's chain.json
    #[derive(Debug, Deserialize)]
    struct FixtureChain {
        blocks: Vec<Block>,
        transactions: Vec<RawTransaction>,
        #[serde(default)]
        failing_heights: Vec<u64>,
        #[serde(default)]
        failing_blocks: Vec<String>,
        #[serde(default)]
        failing_transactions: Vec<String>,
    }

    fn node_error(method: &str, code: i64, message: &str) -> RpcError {
        RpcError::Node {
            method: method.to_string(),
            code,
            message: message.to_string(),
        }
    }

    impl ChainSource for FixtureChain {
        fn block_count(&self) -> Result<u64, RpcError> {
            Ok(self.blocks.len() as u64 - 1)
        }

        fn block_hash(&self, height: u64) -> Result<String, RpcError> {
            if self.failing_heights.contains(&height) {
                return Err(node_error("getblockhash", -8, "Block height out of range"));
            }
            self.blocks
                .get(height as usize)
                .map(|block| block.hash.clone())
                .ok_or_else(|| node_error("getblockhash", -8, "Block height out of range"))
        }

        fn block(&self, hash: &str) -> Result<Block, RpcError> {
            if self.failing_blocks.iter().any(|h| h == hash) {
                return Err(node_error("getblock", -1, "Block not available (pruned data)"));
            }
            self.blocks
                .iter()
                .find(|block| block.hash == hash)
                .cloned()
                .ok_or_else(|| node_error("getblock", -5, "Block not found"))
        }

        fn transaction(&self, txid: &str, _block_hash: &str) -> Result<RawTransaction, RpcError> {
            if self.failing_transactions.iter().any(|t| t == txid) {
                return Err(node_error("getrawtransaction", -5, "No such transaction"));
            }
            self.transactions
                .iter()
                .find(|tx| tx.txid == txid)
                .cloned()
                .ok_or_else(|| node_error("getrawtransaction", -5, "No such transaction"))
        }
    }

    /// Reputation source that records every lookup
    #[derive(Default)]
    struct RecordingReputation {
        calls: RefCell<Vec<String>>,
    }

    impl ReputationSource for RecordingReputation {
        fn lookup(&self, address: &str) -> Result<AddressReputation, ReputationError> {
            self.calls.borrow_mut().push(address.to_string());
            Ok(AddressReputation {
                address: address.to_string(),
                report_count: 0,
                first_seen: None,
                last_seen: None,
            })
        }
    }

    fn fixture_dir(fixture_name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(fixture_name)
    }

    fn load_chain(fixture_name: &str) -> FixtureChain {
        let chain_path = fixture_dir(fixture_name).join("chain.json");
        let contents = fs::read_to_string(&chain_path)
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", chain_path.display(), e));
        serde_json::from_str(&contents)
            .unwrap_or_else(|e| panic!("Invalid fixture {}: {}", chain_path.display(), e))
    }

    fn settings(output_path: &Path, rpc_port: u16, api_key: &str, reputation_url: &str) -> Settings {
        Settings {
            rpc_user: "user".to_string(),
            rpc_password: "pass".to_string(),
            rpc_host: "127.0.0.1".to_string(),
            rpc_port,
            api_key: api_key.to_string(),
            address_to_search: TARGET.to_string(),
            output_path: output_path.to_path_buf(),
            tx_verbosity: 2,
            rpc_timeout_secs: 5,
            progress_interval: 2,
            reputation_url: reputation_url.to_string(),
        }
    }

    fn normalize_csv(content: &str) -> Vec<String> {
        content
            .lines()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect()
    }

    /// Compare the run's CSV export and PDF report with the fixture's expectations
    fn assert_artifacts(fixture_name: &str, summary: &ReportSummary) {
        let expected_path = fixture_dir(fixture_name).join("expected.csv");
        let expected = fs::read_to_string(&expected_path)
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", expected_path.display(), e));
        let actual = fs::read_to_string(&summary.csv_path).unwrap();

        assert_eq!(
            normalize_csv(&actual),
            normalize_csv(&expected),
            "\n\nFixture '{}' CSV mismatch\n\nExpected:\n{}\n\nActual:\n{}\n",
            fixture_name,
            expected,
            actual
        );

        let pdf = fs::read(&summary.report_path).unwrap();
        assert!(pdf.starts_with(b"%PDF"), "Report is not a PDF");
        assert_eq!(
            summary.report_path.file_name().unwrap().to_str().unwrap(),
            "bc1qtarget.pdf"
        );
    }

    /// Balance after the last entry equals deposits minus withdrawals
    fn assert_final_balance(summary: &ReportSummary) {
        let contents = fs::read_to_string(&summary.csv_path).unwrap();
        let mut reader = csv::Reader::from_reader(contents.as_bytes());
        let mut expected = Decimal::ZERO;
        for record in reader.records() {
            let record = record.unwrap();
            let amount = Decimal::from_str(&record[2]).unwrap();
            match &record[1] {
                "Deposit" => expected += amount,
                "Withdrawal" => expected -= amount,
                other => panic!("Unexpected entry type {}", other),
            }
            assert_eq!(Decimal::from_str(&record[4]).unwrap(), expected);
        }
        assert_eq!(summary.balance, expected);
    }

    #[rstest]
    #[case::round_trip("round_trip", 2, 0)]
    #[case::batched_outputs("batched_outputs", 5, 0)]
    #[case::failed_block("failed_block", 2, 3)]
    #[case::nonstandard_scripts("nonstandard_scripts", 1, 0)]
    fn test_fixture(
        #[case] fixture_name: &str,
        #[case] expected_entries: usize,
        #[case] expected_gaps: usize,
    ) {
        let chain = load_chain(fixture_name);
        let output = tempfile::tempdir().unwrap();
        let settings = settings(output.path(), 8332, "", "http://127.0.0.1/check");
        let tip = chain.block_count().unwrap();

        let summary = run_with(&settings, &chain, tip, ReputationLookup::NoApiKey)
            .unwrap_or_else(|e| panic!("Fixture '{}' failed: {}", fixture_name, e));

        assert_eq!(summary.entries, expected_entries);
        assert_eq!(summary.gaps.len(), expected_gaps);
        assert_artifacts(fixture_name, &summary);
        assert_final_balance(&summary);
    }

    #[test]
    fn test_failed_units_are_reported_in_scan_order() {
        let chain = load_chain("failed_block");
        let output = tempfile::tempdir().unwrap();
        let settings = settings(output.path(), 8332, "", "http://127.0.0.1/check");

        let summary = run_with(&settings, &chain, 4, ReputationLookup::NoApiKey).unwrap();

        let units: Vec<String> = summary.gaps.iter().map(|gap| gap.unit()).collect();
        assert_eq!(
            units,
            vec!["block h1", "transaction x3", "block at height 4"]
        );
        assert_eq!(summary.balance, Decimal::ONE);
    }

    #[test]
    fn test_every_collected_address_is_looked_up_once() {
        let chain = load_chain("batched_outputs");
        let output = tempfile::tempdir().unwrap();
        let settings = settings(output.path(), 8332, "key", "http://127.0.0.1/check");
        let reputation = RecordingReputation::default();

        let summary = run_with(&settings, &chain, 1, ReputationLookup::Source(&reputation)).unwrap();

        assert_eq!(*reputation.calls.borrow(), vec!["1Multisig", TARGET]);
        assert_eq!(summary.reputations, 2);
    }

    #[test]
    fn test_round_trip_flow_has_one_edge_per_entry() {
        let chain = load_chain("round_trip");
        let mut builder = LedgerBuilder::new(TARGET);
        ChainScanner::new(&chain)
            .scan(2, |height, tx| builder.apply(height, tx).map(|_| ()))
            .unwrap();
        let ledger = builder.into_ledger();

        let balances: Vec<Decimal> = ledger.entries.iter().map(|e| e.balance).collect();
        assert_eq!(
            balances,
            vec![Decimal::from_str("0.5").unwrap(), Decimal::from_str("0.3").unwrap()]
        );

        let flow = FlowDiagram::from_entries(TARGET, &ledger.entries);
        assert_eq!(flow.edges.len(), 2);
        assert_eq!(flow.edges[0].direction, Direction::Deposit);
        assert_eq!(flow.edges[1].direction, Direction::Withdrawal);
    }

    /// Serve a fixture chain as a JSON-RPC node
    async fn mount_node(server: &MockServer, fixture_name: &str) {
        let chain_path = fixture_dir(fixture_name).join("chain.json");
        let fixture: Value =
            serde_json::from_str(&fs::read_to_string(chain_path).unwrap()).unwrap();
        let blocks = fixture["blocks"].as_array().unwrap();

        let ok = |result: Value| {
            ResponseTemplate::new(200).set_body_json(json!({
                "result": result,
                "error": null,
                "id": "address-ledger"
            }))
        };

        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "method": "getblockcount" })))
            .respond_with(ok(json!(blocks.len() - 1)))
            .mount(server)
            .await;

        for (height, block) in blocks.iter().enumerate() {
            let hash = block["hash"].as_str().unwrap();
            Mock::given(method("POST"))
                .and(body_partial_json(json!({ "method": "getblockhash", "params": [height] })))
                .respond_with(ok(json!(hash)))
                .mount(server)
                .await;
            Mock::given(method("POST"))
                .and(body_partial_json(json!({ "method": "getblock", "params": [hash] })))
                .respond_with(ok(block.clone()))
                .mount(server)
                .await;
        }

        for tx in fixture["transactions"].as_array().unwrap() {
            let txid = tx["txid"].as_str().unwrap();
            let Some(block) = blocks
                .iter()
                .find(|block| block["tx"].as_array().unwrap().contains(&json!(txid)))
            else {
                continue;
            };
            Mock::given(method("POST"))
                .and(body_partial_json(json!({
                    "method": "getrawtransaction",
                    "params": [txid, 2, block["hash"]]
                })))
                .respond_with(ok(tx.clone()))
                .mount(server)
                .await;
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_round_trip_through_rpc_and_reputation_service() {
        let node = MockServer::start().await;
        mount_node(&node, "round_trip").await;

        let reputation_service = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/check"))
            .and(query_param("address", TARGET))
            .and(query_param("api_token", "key123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "address": TARGET,
                "count": 3,
                "first_seen": "2020-09-01",
                "last_seen": "2020-09-12"
            })))
            .expect(1)
            .mount(&reputation_service)
            .await;

        let output = tempfile::tempdir().unwrap();
        let settings = settings(
            output.path(),
            node.address().port(),
            "key123",
            &format!("{}/check", reputation_service.uri()),
        );

        let summary = tokio::task::spawn_blocking(move || run(&settings))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(summary.entries, 2);
        assert_eq!(summary.reputations, 1);
        assert!(summary.gaps.is_empty());
        assert_artifacts("round_trip", &summary);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_empty_api_key_makes_no_reputation_calls() {
        let node = MockServer::start().await;
        mount_node(&node, "round_trip").await;

        let reputation_service = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "count": 0 })))
            .expect(0)
            .mount(&reputation_service)
            .await;

        let output = tempfile::tempdir().unwrap();
        let settings = settings(
            output.path(),
            node.address().port(),
            "",
            &format!("{}/check", reputation_service.uri()),
        );

        let summary = tokio::task::spawn_blocking(move || run(&settings))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(summary.entries, 2);
        assert_eq!(summary.reputations, 0);
        assert_artifacts("round_trip", &summary);
    }
}
