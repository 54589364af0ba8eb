use mockito::{Matcher, Server};
use serde_json::json;
use std::time::Duration;

use wallet_guard::{
	models::{Address, Chain},
	services::blockchain::{EvmClient, HttpTransportClient, LedgerClient},
	utils::http::HttpRetryConfig,
};

const ADDRESS: &str = "0x52908400098527886E0F7030069857D2E4169EE7";

fn address() -> Address {
	Address::parse(ADDRESS, Chain::Ethereum).unwrap()
}

fn client(url: String) -> EvmClient<HttpTransportClient> {
	EvmClient::new(
		&[url],
		Duration::from_secs(2),
		&HttpRetryConfig::with_max_retries(0),
	)
	.unwrap()
}

#[tokio::test]
async fn test_get_balance_uses_lowercase_address() {
	let mut server = Server::new_async().await;
	let mock = server
		.mock("POST", "/")
		.match_body(Matcher::PartialJson(json!({
			"method": "eth_getBalance",
			"params": ["0x52908400098527886e0f7030069857d2e4169ee7", "latest"]
		})))
		.with_status(200)
		.with_body(r#"{"jsonrpc":"2.0","id":1,"result":"0xde0b6b3a7640000"}"#)
		.create_async()
		.await;

	let balance = client(server.url()).get_balance(&address()).await.unwrap();
	assert_eq!(balance, 1_000_000_000_000_000_000);
	mock.assert();
}

#[tokio::test]
async fn test_fallback_is_health_checked_with_net_version() {
	let mut primary = Server::new_async().await;
	let mut fallback = Server::new_async().await;

	let down = primary
		.mock("POST", "/")
		.with_status(503)
		.expect(1)
		.create_async()
		.await;
	let probe = fallback
		.mock("POST", "/")
		.match_body(Matcher::PartialJson(json!({"method": "net_version"})))
		.with_status(200)
		.with_body(r#"{"jsonrpc":"2.0","id":1,"result":"1"}"#)
		.expect(1)
		.create_async()
		.await;
	let balance = fallback
		.mock("POST", "/")
		.match_body(Matcher::PartialJson(json!({"method": "eth_getBalance"})))
		.with_status(200)
		.with_body(r#"{"jsonrpc":"2.0","id":1,"result":"0x2a"}"#)
		.expect(1)
		.create_async()
		.await;

	let client = EvmClient::new(
		&[primary.url(), fallback.url()],
		Duration::from_secs(2),
		&HttpRetryConfig::with_max_retries(0),
	)
	.unwrap();

	assert_eq!(client.get_balance(&address()).await.unwrap(), 42);
	down.assert();
	probe.assert();
	balance.assert();
}

#[tokio::test]
async fn test_transaction_count_comes_from_nonce() {
	let mut server = Server::new_async().await;
	server
		.mock("POST", "/")
		.match_body(Matcher::PartialJson(
			json!({"method": "eth_getTransactionCount"}),
		))
		.with_status(200)
		.with_body(r#"{"jsonrpc":"2.0","id":1,"result":"0x3c"}"#)
		.create_async()
		.await;

	let history = client(server.url())
		.get_transaction_history(&address(), 100)
		.await
		.unwrap();
	assert_eq!(history.transaction_count, 60);
	assert!(history.recent_refs.is_empty());
}

#[tokio::test]
async fn test_busy_empty_account_snapshot() {
	let mut server = Server::new_async().await;
	server
		.mock("POST", "/")
		.match_body(Matcher::PartialJson(json!({"method": "eth_getBalance"})))
		.with_status(200)
		.with_body(r#"{"jsonrpc":"2.0","id":1,"result":"0x0"}"#)
		.create_async()
		.await;
	server
		.mock("POST", "/")
		.match_body(Matcher::PartialJson(
			json!({"method": "eth_getTransactionCount"}),
		))
		.with_status(200)
		.with_body(r#"{"jsonrpc":"2.0","id":1,"result":"0x64"}"#)
		.create_async()
		.await;

	let snapshot = client(server.url())
		.fetch_activity(&address(), 100)
		.await
		.unwrap();
	assert_eq!(snapshot.balance, 0);
	assert_eq!(snapshot.transaction_count, 100);
}

#[tokio::test]
async fn test_non_hex_result_is_an_error() {
	let mut server = Server::new_async().await;
	server
		.mock("POST", "/")
		.with_status(200)
		.with_body(r#"{"jsonrpc":"2.0","id":1,"result":12}"#)
		.create_async()
		.await;

	assert!(client(server.url()).get_balance(&address()).await.is_err());
}
