//! HTTP transport implementation for ledger interactions.
//!
//! A JSON-RPC client over the retryable middleware stack with:
//! - An ordered list of RPC endpoints, first success wins
//! - Transient-error retries per endpoint
//! - Rotation to the next endpoint on network errors, 429 and 5xx

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::{sync::Arc, time::Duration};
use url::Url;

use crate::{
	services::blockchain::{
		transports::{
			BlockchainTransport, EndpointManager, RotatingTransport, TransientErrorRetryStrategy,
		},
		TransportError,
	},
	utils::http::{create_base_client, create_retryable_http_client, HttpRetryConfig},
};

/// Basic HTTP transport client for ledger JSON-RPC endpoints
///
/// The client is cheap to clone and can be shared across tasks.
#[derive(Clone, Debug)]
pub struct HttpTransportClient {
	/// Plain client used for connection probes
	pub client: Arc<Client>,
	/// Manages RPC endpoint rotation and request handling
	endpoint_manager: EndpointManager,
	/// JSON-RPC payload sent when probing a fallback endpoint
	test_connection_payload: Value,
}

impl HttpTransportClient {
	/// Creates a new HTTP transport client
	///
	/// No request is made here; the first URL becomes active and the rest are
	/// fallbacks in the given order. Invalid URLs are skipped.
	///
	/// # Arguments
	/// * `rpc_urls` - Ordered RPC endpoint URLs
	/// * `timeout` - Bound on each individual HTTP attempt
	/// * `retry_config` - Transient retry policy applied per endpoint
	/// * `test_connection_payload` - Probe request (defaults to `net_version`)
	pub fn new(
		rpc_urls: &[String],
		timeout: Duration,
		retry_config: &HttpRetryConfig,
		test_connection_payload: Option<Value>,
	) -> Result<Self, anyhow::Error> {
		let urls: Vec<String> = rpc_urls
			.iter()
			.filter(|url| match Url::parse(url) {
				Ok(_) => true,
				Err(e) => {
					tracing::warn!(url = %url, error = %e, "skipping invalid RPC URL");
					false
				}
			})
			.cloned()
			.collect();

		let (active_url, fallback_urls) = urls
			.split_first()
			.ok_or_else(|| anyhow::anyhow!("No valid RPC URLs configured"))?;

		let http_client = create_base_client(timeout).context("Failed to create HTTP client")?;
		let client = create_retryable_http_client(
			retry_config,
			http_client.clone(),
			Some(TransientErrorRetryStrategy),
		);

		Ok(Self {
			client: Arc::new(http_client),
			endpoint_manager: EndpointManager::new(client, active_url, fallback_urls.to_vec()),
			test_connection_payload: test_connection_payload.unwrap_or_else(|| {
				json!({
					"jsonrpc": "2.0",
					"id": 1,
					"method": "net_version",
					"params": []
				})
			}),
		})
	}
}

#[async_trait]
impl BlockchainTransport for HttpTransportClient {
	async fn get_current_url(&self) -> String {
		self.endpoint_manager.active_url.read().await.clone()
	}

	async fn send_raw_request<P>(
		&self,
		method: &str,
		params: Option<P>,
	) -> Result<Value, TransportError>
	where
		P: Into<Value> + Send + Clone,
	{
		self.endpoint_manager
			.send_raw_request(self, method, params)
			.await
	}
}

#[async_trait]
impl RotatingTransport for HttpTransportClient {
	/// Probes an endpoint with the test payload; any success status passes
	async fn try_connect(&self, url: &str) -> Result<(), anyhow::Error> {
		let url = Url::parse(url).map_err(|_| anyhow::anyhow!("Invalid URL: {}", url))?;

		let response = self
			.client
			.post(url.clone())
			.json(&self.test_connection_payload)
			.send()
			.await
			.map_err(|e| anyhow::anyhow!("Failed to connect to {}: {}", url, e))?;

		if !response.status().is_success() {
			return Err(anyhow::anyhow!(
				"Probe of {} returned status {}",
				url,
				response.status()
			));
		}
		Ok(())
	}

	/// The HTTP client is URL independent; only the URL itself is checked
	async fn update_client(&self, url: &str) -> Result<(), anyhow::Error> {
		Url::parse(url).map_err(|_| anyhow::anyhow!("Invalid URL: {}", url))?;
		Ok(())
	}
}
