//! Network transport implementations for ledger clients.
//!
//! Provides the JSON-RPC over HTTP transport shared by the Solana and EVM
//! clients, the endpoint manager rotating between configured RPC URLs, and
//! the retry strategy used by the HTTP middleware.

mod endpoint_manager;
mod http;

pub use endpoint_manager::EndpointManager;
pub use http::HttpTransportClient;

use reqwest_middleware::Error as MiddlewareError;
use reqwest_retry::{
	default_on_request_failure, default_on_request_success, Retryable, RetryableStrategy,
};
use serde_json::{json, Value};

use crate::services::blockchain::TransportError;

/// HTTP status codes that trigger RPC endpoint rotation
/// - 429: rate limited by the current endpoint
/// - 5xx: the endpoint (or its upstream node) is unhealthy
pub const ROTATE_ON_ERROR_CODES: [u16; 5] = [429, 500, 502, 503, 504];

/// Base trait for all ledger transport clients
#[async_trait::async_trait]
pub trait BlockchainTransport: Send + Sync {
	/// Get the current URL being used by the transport
	async fn get_current_url(&self) -> String;

	/// Send a raw request and return the full JSON-RPC response envelope
	async fn send_raw_request<P>(
		&self,
		method: &str,
		params: Option<P>,
	) -> Result<Value, TransportError>
	where
		P: Into<Value> + Send + Clone;

	/// Customizes the request for specific ledger requirements
	async fn customize_request<P>(&self, method: &str, params: Option<P>) -> Value
	where
		P: Into<Value> + Send + Clone,
	{
		json!({
			"jsonrpc": "2.0",
			"id": 1,
			"method": method,
			"params": params.map(|p| p.into())
		})
	}
}

/// Extension trait for transports that support URL rotation
#[async_trait::async_trait]
pub trait RotatingTransport: BlockchainTransport {
	/// Attempts to establish a connection with a new URL
	async fn try_connect(&self, url: &str) -> Result<(), anyhow::Error>;

	/// Updates the client with a new URL
	async fn update_client(&self, url: &str) -> Result<(), anyhow::Error>;
}

/// Retry strategy for the HTTP middleware.
///
/// Uses the default transient classification except for 429, which is left
/// to endpoint rotation instead of being retried against the same endpoint.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransientErrorRetryStrategy;

impl RetryableStrategy for TransientErrorRetryStrategy {
	fn handle(&self, res: &Result<reqwest::Response, MiddlewareError>) -> Option<Retryable> {
		match res {
			Ok(success) if success.status() == reqwest::StatusCode::TOO_MANY_REQUESTS => {
				Some(Retryable::Fatal)
			}
			Ok(success) => default_on_request_success(success),
			Err(error) => default_on_request_failure(error),
		}
	}
}

/// Extracts `result` from a JSON-RPC response envelope.
///
/// An `error` member becomes [`TransportError::Rpc`]; a missing `result` is a
/// parse error. A `null` result is returned as is.
pub fn into_rpc_result(mut response: Value) -> Result<Value, TransportError> {
	if let Some(error) = response.get("error").filter(|e| !e.is_null()) {
		let code = error.get("code").and_then(Value::as_i64).unwrap_or(0);
		let message = error
			.get("message")
			.and_then(Value::as_str)
			.unwrap_or("unknown error")
			.to_string();
		return Err(TransportError::rpc(code, message));
	}

	match response.get_mut("result") {
		Some(result) => Ok(result.take()),
		None => Err(TransportError::response_parse(
			"JSON-RPC response has neither result nor error",
		)),
	}
}
