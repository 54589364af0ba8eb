use mockito::{Matcher, Server, ServerGuard};
use rust_decimal::Decimal;
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

use wallet_guard::{
	bootstrap::{
		create_activity_analyzer, initialize_services, initialize_services_with_repository,
		registry_chain_codes,
	},
	models::{
		ActivityConfig, AddedBy, Address, AssessmentConfig, Chain, ChainConfig, GuardConfig,
		Receipt, RegistryConfig, ReportCategory, RiskLevel, SourceWallet, StorageConfig, Token,
		TransferRequest,
	},
	repositories::{MemoryUserRepository, ReceiptSink},
	services::{activity::ActivityAnalyzer, risk::NEW_WALLET_REASON},
};

const RECIPIENT: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

fn chain(chain: Chain, url: String, registry_code: Option<&str>) -> ChainConfig {
	ChainConfig {
		chain,
		registry_code: registry_code.map(str::to_string),
		rpc_urls: vec![url],
		rpc_timeout_ms: 2_000,
		max_retries: 0,
	}
}

fn config(registry: &ServerGuard, ledger: &ServerGuard, data_dir: &TempDir) -> GuardConfig {
	GuardConfig {
		registry: RegistryConfig {
			endpoint: registry.url(),
			credential: None,
			timeout_ms: 2_000,
			per_page: 50,
			max_retries: 0,
		},
		chains: vec![
			chain(Chain::Solana, ledger.url(), None),
			chain(Chain::Ethereum, ledger.url(), Some("ETHEREUM")),
		],
		activity: ActivityConfig::default(),
		assessment: AssessmentConfig {
			source_timeout_ms: 5_000,
		},
		storage: StorageConfig {
			data_dir: data_dir.path().to_path_buf(),
		},
	}
}

fn recipient() -> Address {
	Address::parse(RECIPIENT, Chain::Solana).unwrap()
}

#[tokio::test]
async fn test_registry_codes_follow_chain_sections() {
	let registry = Server::new_async().await;
	let ledger = Server::new_async().await;
	let dir = TempDir::new().unwrap();

	let codes = registry_chain_codes(&config(&registry, &ledger, &dir));
	assert_eq!(codes[&Chain::Solana], "SOL");
	assert_eq!(codes[&Chain::Ethereum], "ETHEREUM");
}

#[tokio::test]
async fn test_invalid_rpc_url_fails_initialization() {
	let registry = Server::new_async().await;
	let ledger = Server::new_async().await;
	let dir = TempDir::new().unwrap();

	let mut config = config(&registry, &ledger, &dir);
	config.chains[0].rpc_urls = vec!["not a url".to_string()];

	assert!(create_activity_analyzer(&config).is_err());
	assert!(initialize_services(&config).is_err());
}

#[tokio::test]
async fn test_blocklisted_recipient_is_blocked_end_to_end() {
	let mut registry = Server::new_async().await;
	let mut ledger = Server::new_async().await;
	let dir = TempDir::new().unwrap();

	// A blocked address must not reach the external sources
	let registry_mock = registry
		.mock("GET", Matcher::Any)
		.expect(0)
		.create_async()
		.await;
	let ledger_mock = ledger
		.mock("POST", Matcher::Any)
		.expect(0)
		.create_async()
		.await;

	let services = initialize_services(&config(&registry, &ledger, &dir)).unwrap();
	services
		.blocklist
		.add_entry("alice", &recipient(), Some("fake support".to_string()), AddedBy::Manual)
		.await
		.unwrap();

	let verdict = services.aggregator.assess("alice", &recipient()).await;
	assert!(verdict.is_blocked());
	assert_eq!(verdict.risk_level(), RiskLevel::Blocked);

	registry_mock.assert();
	ledger_mock.assert();
}

#[tokio::test]
async fn test_fresh_wallet_is_low_risk_end_to_end() {
	let mut registry = Server::new_async().await;
	let mut ledger = Server::new_async().await;
	let dir = TempDir::new().unwrap();

	registry
		.mock("GET", Matcher::Regex("^/reports".to_string()))
		.match_query(Matcher::UrlEncoded("chain".into(), "SOL".into()))
		.with_status(200)
		.with_body("[]")
		.create_async()
		.await;
	ledger
		.mock("POST", "/")
		.match_body(Matcher::PartialJson(json!({"method": "getBalance"})))
		.with_status(200)
		.with_body(r#"{"jsonrpc":"2.0","id":1,"result":{"context":{"slot":1},"value":0}}"#)
		.create_async()
		.await;
	ledger
		.mock("POST", "/")
		.match_body(Matcher::PartialJson(
			json!({"method": "getSignaturesForAddress"}),
		))
		.with_status(200)
		.with_body(r#"{"jsonrpc":"2.0","id":1,"result":[]}"#)
		.create_async()
		.await;

	let services = initialize_services_with_repository(
		&config(&registry, &ledger, &dir),
		Arc::new(MemoryUserRepository::new()),
	)
	.unwrap();

	let verdict = services.aggregator.assess("alice", &recipient()).await;
	assert!(verdict.safe());
	assert_eq!(verdict.risk_score(), 10);
	assert_eq!(verdict.risk_level(), RiskLevel::Low);
	assert_eq!(verdict.risk_factors().len(), 1);
	assert_eq!(verdict.risk_factors()[0].reason, NEW_WALLET_REASON);
	assert!(verdict.abuse_registry_result().unwrap().checked);
	assert!(verdict.chain_activity_result().unwrap().is_new_wallet);
}

#[tokio::test]
async fn test_analyzer_without_client_is_unavailable() {
	let registry = Server::new_async().await;
	let ledger = Server::new_async().await;
	let dir = TempDir::new().unwrap();

	let mut config = config(&registry, &ledger, &dir);
	config.chains.retain(|c| c.chain == Chain::Ethereum);

	let analyzer = create_activity_analyzer(&config).unwrap();
	let result = analyzer.analyze(&recipient()).await;
	assert!(!result.analyzed);
	assert!(result.error.is_some());
}

#[tokio::test]
async fn test_receipts_land_in_data_dir() {
	let registry = Server::new_async().await;
	let ledger = Server::new_async().await;
	let dir = TempDir::new().unwrap();

	let services = initialize_services(&config(&registry, &ledger, &dir)).unwrap();
	let request = TransferRequest {
		from: SourceWallet {
			name: "Phantom".to_string(),
			address: Address::parse("11111111111111111111111111111111", Chain::Solana).unwrap(),
			balance: Decimal::from(2),
		},
		to: recipient(),
		amount: Decimal::ONE,
		token: Token::Native,
	};
	services
		.receipts
		.record(&Receipt::for_transfer("alice", &request, "sig"))
		.await
		.unwrap();

	assert!(dir.path().join("receipts").join("alice.jsonl").exists());
	assert_eq!(services.receipts.list("alice").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_fraud_reports_land_in_data_dir() {
	let registry = Server::new_async().await;
	let ledger = Server::new_async().await;
	let dir = TempDir::new().unwrap();

	let services = initialize_services(&config(&registry, &ledger, &dir)).unwrap();
	services
		.reports
		.submit_report("alice", &recipient(), ReportCategory::Scam, None)
		.await
		.unwrap();

	assert_eq!(
		std::fs::read_dir(dir.path().join("reports")).unwrap().count(),
		1
	);
	let listed = services.reports.list_reports(10).await.unwrap();
	assert_eq!(listed.len(), 1);
	assert_eq!(listed[0].reporters, vec!["alice"]);
}
