//! EVM ledger client.
//!
//! Standard JSON-RPC has no per-address history call, so the transaction
//! count is the account nonce (transactions sent from the address) and no
//! recent references are reported.

use anyhow::Context;
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tracing::instrument;

use crate::{
	models::{Address, Chain},
	services::blockchain::{
		clients::{parse_hex_quantity, LedgerClient, TransactionHistory},
		transports::{into_rpc_result, BlockchainTransport, HttpTransportClient},
	},
	utils::http::HttpRetryConfig,
};

/// Client for EVM JSON-RPC endpoints
#[derive(Clone)]
pub struct EvmClient<T: Send + Sync + Clone> {
	http_client: T,
}

impl<T: Send + Sync + Clone> EvmClient<T> {
	/// Creates a new EVM client with a specific transport client
	pub fn new_with_transport(http_client: T) -> Self {
		Self { http_client }
	}
}

impl EvmClient<HttpTransportClient> {
	/// Creates a client over the given RPC URLs, probing fallbacks with `net_version`
	pub fn new(
		rpc_urls: &[String],
		timeout: Duration,
		retry_config: &HttpRetryConfig,
	) -> Result<Self, anyhow::Error> {
		let probe = json!({"jsonrpc": "2.0", "id": 1, "method": "net_version", "params": []});
		let http_client = HttpTransportClient::new(rpc_urls, timeout, retry_config, Some(probe))?;
		Ok(Self::new_with_transport(http_client))
	}
}

impl<T: Send + Sync + Clone + BlockchainTransport> EvmClient<T> {
	async fn quantity(&self, method: &str, address: &Address) -> Result<u128, anyhow::Error> {
		let response = self
			.http_client
			.send_raw_request(method, Some(json!([address.as_str(), "latest"])))
			.await
			.with_context(|| format!("Failed to call {} for {}", method, address))?;

		let result = into_rpc_result(response)?;
		let quantity = result
			.as_str()
			.ok_or_else(|| anyhow::anyhow!("{} returned a non-string result", method))?;
		parse_hex_quantity(quantity)
	}
}

#[async_trait]
impl<T: Send + Sync + Clone + BlockchainTransport> LedgerClient for EvmClient<T> {
	fn chain(&self) -> Chain {
		Chain::Ethereum
	}

	#[instrument(skip(self, address), fields(address = %address))]
	async fn get_balance(&self, address: &Address) -> Result<u128, anyhow::Error> {
		self.quantity("eth_getBalance", address).await
	}

	#[instrument(skip(self, address), fields(address = %address))]
	async fn get_transaction_history(
		&self,
		address: &Address,
		_limit: usize,
	) -> Result<TransactionHistory, anyhow::Error> {
		let nonce = self.quantity("eth_getTransactionCount", address).await?;
		Ok(TransactionHistory {
			transaction_count: u64::try_from(nonce).unwrap_or(u64::MAX),
			recent_refs: Vec::new(),
		})
	}
}
