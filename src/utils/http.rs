//! HTTP client construction shared by the registry and ledger clients.
//!
//! Every outbound client is a `reqwest` client with a hard request timeout,
//! wrapped in `reqwest-middleware` with transient-error retries. Retries are
//! bounded by the configured count; the overall per-source budget is enforced
//! separately by the risk aggregator.

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{
	policies::ExponentialBackoff, Jitter, RetryTransientMiddleware, RetryableStrategy,
};
use std::time::Duration;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Configuration for HTTP retry policies
#[derive(Debug, Clone)]
pub struct HttpRetryConfig {
	/// Maximum number of retries for transient errors
	pub max_retries: u32,
	/// Base duration for exponential backoff calculations
	pub base_for_backoff: u32,
	/// Initial backoff duration before the first retry
	pub initial_backoff: Duration,
	/// Maximum backoff duration for retries
	pub max_backoff: Duration,
	/// Jitter to apply to the backoff duration
	pub jitter: Jitter,
}

impl Default for HttpRetryConfig {
	fn default() -> Self {
		Self {
			max_retries: 2,
			base_for_backoff: 2,
			initial_backoff: Duration::from_millis(200),
			max_backoff: Duration::from_secs(2),
			jitter: Jitter::Full,
		}
	}
}

impl HttpRetryConfig {
	/// Default backoff with a specific retry count (0 disables retries)
	pub fn with_max_retries(max_retries: u32) -> Self {
		Self {
			max_retries,
			..Self::default()
		}
	}
}

/// Builds the plain client every middleware stack wraps.
///
/// `timeout` bounds each individual attempt, including connect.
pub fn create_base_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
	reqwest::Client::builder()
		.timeout(timeout)
		.connect_timeout(timeout)
		.user_agent(USER_AGENT)
		.pool_max_idle_per_host(4)
		.build()
}

/// Creates a retryable HTTP client with middleware
///
/// # Parameters:
/// - `config`: Configuration for retry policies
/// - `base_client`: The base HTTP client to use
/// - `custom_strategy`: Optional strategy replacing the default transient classification
///
/// # Returns
/// A `ClientWithMiddleware` that includes retry capabilities
pub fn create_retryable_http_client<S>(
	config: &HttpRetryConfig,
	base_client: reqwest::Client,
	custom_strategy: Option<S>,
) -> ClientWithMiddleware
where
	S: RetryableStrategy + Send + Sync + 'static,
{
	let retry_policy = ExponentialBackoff::builder()
		.base(config.base_for_backoff)
		.retry_bounds(config.initial_backoff, config.max_backoff)
		.jitter(config.jitter)
		.build_with_max_retries(config.max_retries);

	if let Some(strategy) = custom_strategy {
		ClientBuilder::new(base_client).with(
			RetryTransientMiddleware::new_with_policy_and_strategy(retry_policy, strategy),
		)
	} else {
		ClientBuilder::new(base_client)
			.with(RetryTransientMiddleware::new_with_policy(retry_policy))
	}
	.build()
}
