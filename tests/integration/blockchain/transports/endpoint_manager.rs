use mockito::{Matcher, Server};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::RwLock;

use wallet_guard::services::blockchain::{
	BlockchainTransport, EndpointManager, RotatingTransport, TransportError,
};

// Transport whose connection probe is a plain GET, so that POST mocks only
// count JSON-RPC requests
#[derive(Clone)]
struct MockTransport {
	client: reqwest::Client,
	current_url: Arc<RwLock<String>>,
}

impl MockTransport {
	fn new() -> Self {
		Self {
			client: reqwest::Client::new(),
			current_url: Arc::new(RwLock::new(String::new())),
		}
	}
}

#[async_trait::async_trait]
impl BlockchainTransport for MockTransport {
	async fn get_current_url(&self) -> String {
		self.current_url.read().await.clone()
	}

	async fn send_raw_request<P>(
		&self,
		_method: &str,
		_params: Option<P>,
	) -> Result<Value, TransportError>
	where
		P: Into<Value> + Send + Clone,
	{
		Ok(json!({"jsonrpc": "2.0", "id": 1, "result": "mocked_response"}))
	}
}

#[async_trait::async_trait]
impl RotatingTransport for MockTransport {
	async fn try_connect(&self, url: &str) -> Result<(), anyhow::Error> {
		let response = self
			.client
			.get(url)
			.send()
			.await
			.map_err(|e| anyhow::anyhow!("Failed to connect: {}", e))?;
		if response.status().is_success() {
			Ok(())
		} else {
			Err(anyhow::anyhow!("probe returned {}", response.status()))
		}
	}

	async fn update_client(&self, url: &str) -> Result<(), anyhow::Error> {
		*self.current_url.write().await = url.to_string();
		Ok(())
	}
}

fn get_mock_client_builder() -> ClientWithMiddleware {
	ClientBuilder::new(reqwest::Client::new()).build()
}

fn rpc_body(method: &str) -> Matcher {
	Matcher::PartialJson(json!({"jsonrpc": "2.0", "method": method}))
}

#[tokio::test]
async fn test_endpoint_rotation() {
	let server1 = Server::new_async().await;
	let mut server2 = Server::new_async().await;
	let server3 = Server::new_async().await;

	let probe = server2
		.mock("GET", "/")
		.with_status(200)
		.create_async()
		.await;

	let manager = EndpointManager::new(
		get_mock_client_builder(),
		server1.url().as_ref(),
		vec![server2.url(), server3.url()],
	);
	let transport = MockTransport::new();

	manager.rotate_url(&transport).await.unwrap();

	assert_eq!(&*manager.active_url.read().await, &server2.url());
	assert_eq!(
		&*manager.fallback_urls.read().await,
		&vec![server3.url(), server1.url()]
	);
	assert_eq!(transport.get_current_url().await, server2.url());
	probe.assert();
}

#[tokio::test]
async fn test_rotation_without_fallbacks_fails() {
	let server = Server::new_async().await;
	let manager = EndpointManager::new(get_mock_client_builder(), server.url().as_ref(), vec![]);

	let result = manager.rotate_url(&MockTransport::new()).await;
	assert!(matches!(result, Err(TransportError::UrlRotation(_))));
	assert_eq!(&*manager.active_url.read().await, &server.url());
}

#[tokio::test]
async fn test_failed_probe_keeps_active_url() {
	let server1 = Server::new_async().await;
	let mut server2 = Server::new_async().await;

	let probe = server2
		.mock("GET", "/")
		.with_status(503)
		.create_async()
		.await;

	let manager = EndpointManager::new(
		get_mock_client_builder(),
		server1.url().as_ref(),
		vec![server2.url()],
	);

	let result = manager.rotate_url(&MockTransport::new()).await;
	assert!(matches!(result, Err(TransportError::UrlRotation(_))));
	assert_eq!(&*manager.active_url.read().await, &server1.url());
	assert_eq!(&*manager.fallback_urls.read().await, &vec![server2.url()]);
	probe.assert();
}

#[tokio::test]
async fn test_send_raw_request_rotates_on_server_error() {
	let mut server1 = Server::new_async().await;
	let mut server2 = Server::new_async().await;

	let failing = server1
		.mock("POST", "/")
		.match_body(rpc_body("getBalance"))
		.with_status(503)
		.expect(1)
		.create_async()
		.await;
	let probe = server2
		.mock("GET", "/")
		.with_status(200)
		.create_async()
		.await;
	let healthy = server2
		.mock("POST", "/")
		.match_body(rpc_body("getBalance"))
		.with_status(200)
		.with_body(r#"{"jsonrpc":"2.0","id":1,"result":{"value":42}}"#)
		.expect(1)
		.create_async()
		.await;

	let manager = EndpointManager::new(
		get_mock_client_builder(),
		server1.url().as_ref(),
		vec![server2.url()],
	);
	let transport = MockTransport::new();

	let response = manager
		.send_raw_request(&transport, "getBalance", Some(json!(["addr"])))
		.await
		.unwrap();

	assert_eq!(response["result"]["value"], 42);
	assert_eq!(&*manager.active_url.read().await, &server2.url());
	failing.assert();
	probe.assert();
	healthy.assert();
}

#[tokio::test]
async fn test_send_raw_request_rotates_on_rate_limit() {
	let mut server1 = Server::new_async().await;
	let mut server2 = Server::new_async().await;

	let limited = server1
		.mock("POST", "/")
		.with_status(429)
		.expect(1)
		.create_async()
		.await;
	server2
		.mock("GET", "/")
		.with_status(200)
		.create_async()
		.await;
	let healthy = server2
		.mock("POST", "/")
		.with_status(200)
		.with_body(r#"{"jsonrpc":"2.0","id":1,"result":"ok"}"#)
		.create_async()
		.await;

	let manager = EndpointManager::new(
		get_mock_client_builder(),
		server1.url().as_ref(),
		vec![server2.url()],
	);

	let response = manager
		.send_raw_request(&MockTransport::new(), "getHealth", None::<Value>)
		.await
		.unwrap();
	assert_eq!(response["result"], "ok");
	limited.assert();
	healthy.assert();
}

#[tokio::test]
async fn test_send_raw_request_does_not_rotate_on_client_error() {
	let mut server1 = Server::new_async().await;
	let server2 = Server::new_async().await;

	let bad_request = server1
		.mock("POST", "/")
		.with_status(400)
		.with_body("bad request")
		.expect(1)
		.create_async()
		.await;

	let manager = EndpointManager::new(
		get_mock_client_builder(),
		server1.url().as_ref(),
		vec![server2.url()],
	);

	let result = manager
		.send_raw_request(&MockTransport::new(), "getBalance", Some(json!(["addr"])))
		.await;

	match result {
		Err(TransportError::Http { status, body, .. }) => {
			assert_eq!(status.as_u16(), 400);
			assert_eq!(body, "bad request");
		}
		other => panic!("expected HTTP error, got {:?}", other),
	}
	assert_eq!(&*manager.active_url.read().await, &server1.url());
	bad_request.assert();
}

#[tokio::test]
async fn test_send_raw_request_gives_up_after_every_endpoint() {
	let mut server1 = Server::new_async().await;
	let mut server2 = Server::new_async().await;

	let first = server1
		.mock("POST", "/")
		.with_status(500)
		.expect(1)
		.create_async()
		.await;
	server2
		.mock("GET", "/")
		.with_status(200)
		.create_async()
		.await;
	let second = server2
		.mock("POST", "/")
		.with_status(502)
		.expect(1)
		.create_async()
		.await;

	let manager = EndpointManager::new(
		get_mock_client_builder(),
		server1.url().as_ref(),
		vec![server2.url()],
	);

	let result = manager
		.send_raw_request(&MockTransport::new(), "getBalance", Some(json!(["addr"])))
		.await;

	assert_eq!(
		result.unwrap_err().status().map(|s| s.as_u16()),
		Some(502)
	);
	first.assert();
	second.assert();
}

#[tokio::test]
async fn test_send_raw_request_rotates_on_network_error() {
	let mut server = Server::new_async().await;

	server
		.mock("GET", "/")
		.with_status(200)
		.create_async()
		.await;
	let healthy = server
		.mock("POST", "/")
		.with_status(200)
		.with_body(r#"{"jsonrpc":"2.0","id":1,"result":7}"#)
		.create_async()
		.await;

	// Nothing listens on port 1
	let manager = EndpointManager::new(
		get_mock_client_builder(),
		"http://127.0.0.1:1",
		vec![server.url()],
	);

	let response = manager
		.send_raw_request(&MockTransport::new(), "getBalance", Some(json!(["addr"])))
		.await
		.unwrap();
	assert_eq!(response["result"], 7);
	assert_eq!(&*manager.active_url.read().await, &server.url());
	healthy.assert();
}
