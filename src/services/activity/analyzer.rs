//! Chain activity analyzer implementation.

use async_trait::async_trait;
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, instrument, warn};

use crate::{
	models::{ActivityConfig, Address, Chain, ChainActivityResult},
	services::blockchain::LedgerClient,
};

/// Produces the activity read-out for an address.
///
/// Never fails: a ledger error yields `analyzed: false` with no flags raised.
#[async_trait]
pub trait ActivityAnalyzer: Send + Sync {
	async fn analyze(&self, address: &Address) -> ChainActivityResult;
}

/// Analyzer dispatching to one ledger client per chain
#[derive(Clone)]
pub struct ChainActivityAnalyzer {
	clients: HashMap<Chain, Arc<dyn LedgerClient>>,
	signature_limit: usize,
	max_recent_refs: usize,
}

impl ChainActivityAnalyzer {
	pub fn new(config: &ActivityConfig) -> Self {
		Self {
			clients: HashMap::new(),
			signature_limit: config.signature_limit,
			max_recent_refs: config.max_recent_refs,
		}
	}

	/// Registers the client used for addresses of its chain
	pub fn with_client(mut self, client: Arc<dyn LedgerClient>) -> Self {
		self.clients.insert(client.chain(), client);
		self
	}
}

#[async_trait]
impl ActivityAnalyzer for ChainActivityAnalyzer {
	#[instrument(skip(self, address), fields(address = %address, chain = %address.chain()))]
	async fn analyze(&self, address: &Address) -> ChainActivityResult {
		let Some(client) = self.clients.get(&address.chain()) else {
			warn!("no ledger client configured");
			return ChainActivityResult::unavailable(format!(
				"No ledger client configured for {}",
				address.chain()
			));
		};

		match client.fetch_activity(address, self.signature_limit).await {
			Ok(snapshot) => {
				let result =
					ChainActivityResult::from_snapshot(address.chain(), snapshot, self.max_recent_refs);
				debug!(
					transactions = result.transaction_count,
					new_wallet = result.is_new_wallet,
					suspicious = result.suspicious_pattern,
					"activity analyzed"
				);
				result
			}
			Err(e) => {
				warn!(error = %format!("{:#}", e), "ledger query failed");
				ChainActivityResult::unavailable(format!("{:#}", e))
			}
		}
	}
}
