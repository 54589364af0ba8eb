//! Solana ledger client.

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::instrument;

use crate::{
	models::{Address, Chain},
	services::blockchain::{
		clients::{LedgerClient, TransactionHistory},
		transports::{into_rpc_result, BlockchainTransport, HttpTransportClient},
	},
	utils::http::HttpRetryConfig,
};

/// `getSignaturesForAddress` accepts at most this many entries per call
pub const MAX_SIGNATURE_LIMIT: usize = 1000;

#[derive(Debug, Deserialize)]
struct BalanceResult {
	value: u64,
}

#[derive(Debug, Deserialize)]
struct SignatureInfo {
	signature: String,
}

/// Client for Solana JSON-RPC endpoints
#[derive(Clone)]
pub struct SolanaClient<T: Send + Sync + Clone> {
	http_client: T,
}

impl<T: Send + Sync + Clone> SolanaClient<T> {
	/// Creates a new Solana client with a specific transport client
	pub fn new_with_transport(http_client: T) -> Self {
		Self { http_client }
	}
}

impl SolanaClient<HttpTransportClient> {
	/// Creates a client over the given RPC URLs, probing fallbacks with `getHealth`
	pub fn new(
		rpc_urls: &[String],
		timeout: Duration,
		retry_config: &HttpRetryConfig,
	) -> Result<Self, anyhow::Error> {
		let probe = json!({"jsonrpc": "2.0", "id": 1, "method": "getHealth"});
		let http_client = HttpTransportClient::new(rpc_urls, timeout, retry_config, Some(probe))?;
		Ok(Self::new_with_transport(http_client))
	}
}

#[async_trait]
impl<T: Send + Sync + Clone + BlockchainTransport> LedgerClient for SolanaClient<T> {
	fn chain(&self) -> Chain {
		Chain::Solana
	}

	#[instrument(skip(self, address), fields(address = %address))]
	async fn get_balance(&self, address: &Address) -> Result<u128, anyhow::Error> {
		let response = self
			.http_client
			.send_raw_request("getBalance", Some(json!([address.as_str()])))
			.await
			.with_context(|| format!("Failed to fetch balance for {}", address))?;

		let result = into_rpc_result(response)?;
		let balance: BalanceResult =
			serde_json::from_value(result).context("Failed to parse getBalance result")?;
		Ok(u128::from(balance.value))
	}

	#[instrument(skip(self, address), fields(address = %address))]
	async fn get_transaction_history(
		&self,
		address: &Address,
		limit: usize,
	) -> Result<TransactionHistory, anyhow::Error> {
		let limit = limit.clamp(1, MAX_SIGNATURE_LIMIT);
		let params: Value = json!([address.as_str(), { "limit": limit }]);

		let response = self
			.http_client
			.send_raw_request("getSignaturesForAddress", Some(params))
			.await
			.with_context(|| format!("Failed to fetch signatures for {}", address))?;

		let result = into_rpc_result(response)?;
		let signatures: Vec<SignatureInfo> = if result.is_null() {
			Vec::new()
		} else {
			serde_json::from_value(result)
				.context("Failed to parse getSignaturesForAddress result")?
		};

		Ok(TransactionHistory {
			transaction_count: signatures.len() as u64,
			recent_refs: signatures.into_iter().map(|s| s.signature).collect(),
		})
	}
}
