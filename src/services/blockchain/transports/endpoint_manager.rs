//! Manages the rotation of ledger HTTP RPC endpoints
//!
//! Requests go to the active URL; on a network error or a rotation status
//! code the manager promotes the next fallback URL and retries, so the first
//! endpoint that answers wins. Each request tries every configured endpoint at
//! most once.
use reqwest_middleware::ClientWithMiddleware;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::services::blockchain::{
	transports::{RotatingTransport, ROTATE_ON_ERROR_CODES},
	TransportError,
};

/// Manages the rotation of ledger RPC endpoints
///
/// # Fields
/// * `active_url` - The current active URL
/// * `fallback_urls` - Remaining URLs in rotation order
/// * `client` - The middleware client used to send requests
/// * `rotation_lock` - Serializes concurrent rotations
#[derive(Clone, Debug)]
pub struct EndpointManager {
	pub active_url: Arc<RwLock<String>>,
	pub fallback_urls: Arc<RwLock<Vec<String>>>,
	client: ClientWithMiddleware,
	rotation_lock: Arc<tokio::sync::Mutex<()>>,
}

/// Outcome of a single attempt against one URL
#[derive(Debug)]
enum SingleRequestAttemptOutcome {
	/// Got a response (status might still be an error)
	Success(reqwest::Response),
	/// Error during send (connection, timeout)
	NetworkError(reqwest_middleware::Error),
	/// Error serializing the request body
	SerializationError(TransportError),
}

impl EndpointManager {
	/// Creates a new rotating URL client
	///
	/// # Arguments
	/// * `client` - The client to use for the endpoint manager
	/// * `active_url` - The initial active URL
	/// * `fallback_urls` - A list of fallback URLs to rotate to, in order
	pub fn new(client: ClientWithMiddleware, active_url: &str, fallback_urls: Vec<String>) -> Self {
		Self {
			active_url: Arc::new(RwLock::new(active_url.to_string())),
			fallback_urls: Arc::new(RwLock::new(fallback_urls)),
			rotation_lock: Arc::new(tokio::sync::Mutex::new(())),
			client,
		}
	}

	/// Rotates to the next available URL
	///
	/// The previous active URL goes to the back of the fallback list. A
	/// fallback that fails its connection probe keeps its place at the back.
	pub async fn rotate_url<T: RotatingTransport>(
		&self,
		transport: &T,
	) -> Result<(), TransportError> {
		let _guard = self.rotation_lock.lock().await;

		let current_active = self.active_url.read().await.clone();

		let new_url = {
			let mut fallback_urls = self.fallback_urls.write().await;
			match fallback_urls.iter().position(|url| url != &current_active) {
				Some(pos) => fallback_urls.remove(pos),
				None => {
					return Err(TransportError::url_rotation(format!(
						"No fallback URLs available for rotation. Current active URL: {}",
						current_active
					)));
				}
			}
		};

		if let Err(e) = transport.try_connect(&new_url).await {
			self.fallback_urls.write().await.push(new_url.clone());
			return Err(TransportError::url_rotation(format!(
				"Failed to connect to {}: {}",
				new_url, e
			)));
		}

		transport.update_client(&new_url).await.map_err(|e| {
			TransportError::url_rotation(format!(
				"Failed to update transport client with {}: {}",
				new_url, e
			))
		})?;

		let mut active_url = self.active_url.write().await;
		let mut fallback_urls = self.fallback_urls.write().await;
		tracing::debug!(from = %current_active, to = %new_url, "rotated RPC endpoint");
		fallback_urls.push(current_active);
		*active_url = new_url;
		Ok(())
	}

	/// Rotates when fallbacks exist and, for HTTP failures, the status calls for it.
	///
	/// # Returns
	/// * `Ok(true)` - Rotation succeeded, caller should retry the request
	/// * `Ok(false)` - No rotation was needed or possible
	/// * `Err` - Rotation was attempted but failed
	async fn should_attempt_rotation<T: RotatingTransport>(
		&self,
		transport: &T,
		status: Option<u16>,
	) -> Result<bool, TransportError> {
		let should_rotate = {
			let fallback_urls = self.fallback_urls.read().await;
			!fallback_urls.is_empty()
				&& status.map_or(true, |s| ROTATE_ON_ERROR_CODES.contains(&s))
		};

		if should_rotate {
			self.rotate_url(transport).await?;
			Ok(true)
		} else {
			Ok(false)
		}
	}

	async fn attempt_request_on_url<T, P>(
		&self,
		url: &str,
		transport: &T,
		method: &str,
		params: Option<P>,
	) -> SingleRequestAttemptOutcome
	where
		T: RotatingTransport,
		P: Into<Value> + Send + Clone,
	{
		let request_body = transport.customize_request(method, params).await;
		let request_body_str = match serde_json::to_string(&request_body) {
			Ok(body) => body,
			Err(e) => {
				return SingleRequestAttemptOutcome::SerializationError(
					TransportError::request_serialization(e.to_string()),
				);
			}
		};

		match self
			.client
			.post(url)
			.header("Content-Type", "application/json")
			.body(request_body_str)
			.send()
			.await
		{
			Ok(response) => SingleRequestAttemptOutcome::Success(response),
			Err(network_error) => SingleRequestAttemptOutcome::NetworkError(network_error),
		}
	}

	/// Sends a raw request with automatic URL rotation on failure
	///
	/// # Returns
	/// * `Result<Value, TransportError>` - The JSON-RPC envelope from the first
	///   endpoint that answered successfully
	pub async fn send_raw_request<T, P>(
		&self,
		transport: &T,
		method: &str,
		params: Option<P>,
	) -> Result<Value, TransportError>
	where
		T: RotatingTransport,
		P: Into<Value> + Send + Clone,
	{
		let max_attempts = 1 + self.fallback_urls.read().await.len();
		let mut attempt = 0;

		loop {
			attempt += 1;
			let current_url = self.active_url.read().await.clone();
			let last_attempt = attempt >= max_attempts;

			match self
				.attempt_request_on_url(&current_url, transport, method, params.clone())
				.await
			{
				SingleRequestAttemptOutcome::Success(response) => {
					let status = response.status();
					if status.is_success() {
						return response.json().await.map_err(|e| {
							TransportError::response_parse(format!(
								"Failed to parse JSON response from {}: {}",
								current_url, e
							))
						});
					}

					let error_body = response.text().await.unwrap_or_default();
					tracing::warn!(url = %current_url, %status, method, "RPC request failed");

					if !last_attempt
						&& self
							.should_attempt_rotation(transport, Some(status.as_u16()))
							.await?
					{
						continue;
					}
					return Err(TransportError::http(status, current_url, error_body));
				}
				SingleRequestAttemptOutcome::NetworkError(network_error) => {
					tracing::warn!(url = %current_url, method, error = %network_error, "RPC endpoint unreachable");

					if !last_attempt && self.should_attempt_rotation(transport, None).await? {
						continue;
					}
					return Err(TransportError::network(format!(
						"Failed to send request to {}: {}",
						current_url, network_error
					)));
				}
				SingleRequestAttemptOutcome::SerializationError(error) => return Err(error),
			}
		}
	}
}
