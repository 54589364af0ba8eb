//! Abuse registry HTTP client.

use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use reqwest_retry::DefaultRetryableStrategy;
use std::{collections::HashMap, time::Duration};
use tracing::{info, instrument, warn};
use url::Url;

use crate::{
	models::{AbuseQueryResult, Address, Chain, RegistryConfig, RegistryCredential},
	services::registry::{envelope::parse_envelope, error::RegistryError},
	utils::http::{create_base_client, create_retryable_http_client, HttpRetryConfig},
};

/// Lookup of fraud reports filed against an address.
///
/// Never fails: an unreachable or misbehaving registry yields a degraded
/// result (`checked: false`) carrying a warning.
#[async_trait]
pub trait AbuseRegistry: Send + Sync {
	async fn query(&self, address: &Address) -> AbuseQueryResult;
}

/// Client for a ChainAbuse-style REST registry
pub struct AbuseRegistryClient {
	client: ClientWithMiddleware,
	reports_url: Url,
	credential: Option<RegistryCredential>,
	per_page: u32,
	timeout: Duration,
	chain_codes: HashMap<Chain, String>,
}

impl AbuseRegistryClient {
	/// Builds a client from the registry section of the configuration
	///
	/// # Arguments
	/// * `config` - Endpoint, credential, timeout and paging
	/// * `chain_codes` - Registry code per chain; chains missing here use
	///   their built-in code
	pub fn new(
		config: &RegistryConfig,
		chain_codes: HashMap<Chain, String>,
	) -> Result<Self, RegistryError> {
		let reports_url = Url::parse(&format!(
			"{}/reports",
			config.endpoint.trim_end_matches('/')
		))
		.map_err(|e| RegistryError::configuration(format!("invalid endpoint: {}", e)))?;

		let base_client = create_base_client(config.timeout())
			.map_err(|e| RegistryError::configuration(e.to_string()))?;
		let client = create_retryable_http_client::<DefaultRetryableStrategy>(
			&HttpRetryConfig::with_max_retries(config.max_retries),
			base_client,
			None,
		);

		Ok(Self {
			client,
			reports_url,
			credential: config.credential.clone(),
			per_page: config.per_page,
			timeout: config.timeout(),
			chain_codes,
		})
	}

	fn chain_code(&self, chain: Chain) -> &str {
		self.chain_codes
			.get(&chain)
			.map(String::as_str)
			.unwrap_or_else(|| chain.default_registry_code())
	}

	fn request_url(&self, address: &Address) -> Url {
		let mut url = self.reports_url.clone();
		url.query_pairs_mut()
			.append_pair("address", address.as_str())
			.append_pair("chain", self.chain_code(address.chain()))
			.append_pair("includePrivate", "false")
			.append_pair("page", "1")
			.append_pair("perPage", &self.per_page.to_string());
		url
	}

	async fn fetch(&self, address: &Address) -> Result<AbuseQueryResult, RegistryError> {
		let mut request = self
			.client
			.get(self.request_url(address))
			.header(reqwest::header::ACCEPT, "application/json");

		request = match &self.credential {
			Some(RegistryCredential::Basic { username, password }) => {
				request.basic_auth(username, Some(password.expose()))
			}
			Some(RegistryCredential::Bearer { token }) => request.bearer_auth(token.expose()),
			None => request,
		};

		let response = request
			.send()
			.await
			.map_err(|e| RegistryError::network(e.to_string()))?;

		let status = response.status();
		if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
		{
			return Err(RegistryError::authentication(status.as_u16()));
		}
		if !status.is_success() {
			return Err(RegistryError::http(status.as_u16()));
		}

		let body = response
			.bytes()
			.await
			.map_err(|e| RegistryError::network(e.to_string()))?;
		let parsed =
			parse_envelope(&body).map_err(|e| RegistryError::unrecognized_envelope(e.to_string()))?;

		Ok(AbuseQueryResult::from_reports(parsed.reports, parsed.total))
	}
}

#[async_trait]
impl AbuseRegistry for AbuseRegistryClient {
	#[instrument(skip(self, address), fields(address = %address))]
	async fn query(&self, address: &Address) -> AbuseQueryResult {
		let outcome = match tokio::time::timeout(self.timeout, self.fetch(address)).await {
			Ok(outcome) => outcome,
			Err(_) => Err(RegistryError::timeout(self.timeout.as_millis() as u64)),
		};

		match outcome {
			Ok(result) => {
				info!(
					chain = self.chain_code(address.chain()),
					reports = result.total_reports,
					"registry lookup complete"
				);
				result
			}
			Err(e) => {
				warn!(
					host = self.reports_url.host_str().unwrap_or_default(),
					error = %e,
					"registry lookup degraded"
				);
				AbuseQueryResult::unavailable(e.warning())
			}
		}
	}
}
