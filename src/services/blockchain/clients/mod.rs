//! Ledger client implementations.
//!
//! Contains the chain specific clients:
//! - Solana client (`getBalance`, `getSignaturesForAddress`)
//! - EVM client (`eth_getBalance`, `eth_getTransactionCount`)
//!
//! Both sit behind [`LedgerClient`], which is all the activity analyzer needs.

mod evm;
mod solana;

use async_trait::async_trait;
pub use evm::EvmClient;
pub use solana::SolanaClient;

use crate::models::{Address, Chain, ChainActivitySnapshot};

/// Transaction history of an address as far as the ledger reports it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionHistory {
	pub transaction_count: u64,
	/// Most recent first
	pub recent_refs: Vec<String>,
}

/// Read access to the ledger needed for activity analysis
#[async_trait]
pub trait LedgerClient: Send + Sync {
	/// The chain this client talks to
	fn chain(&self) -> Chain;

	/// Balance in the chain's smallest unit (lamports, wei)
	async fn get_balance(&self, address: &Address) -> Result<u128, anyhow::Error>;

	/// Up to `limit` recent transactions for the address
	async fn get_transaction_history(
		&self,
		address: &Address,
		limit: usize,
	) -> Result<TransactionHistory, anyhow::Error>;

	/// Balance and history fetched concurrently
	async fn fetch_activity(
		&self,
		address: &Address,
		limit: usize,
	) -> Result<ChainActivitySnapshot, anyhow::Error> {
		let (balance, history) = tokio::try_join!(
			self.get_balance(address),
			self.get_transaction_history(address, limit)
		)?;

		Ok(ChainActivitySnapshot {
			balance,
			transaction_count: history.transaction_count,
			recent_transaction_refs: history.recent_refs,
		})
	}
}

/// Parses a `0x`-prefixed JSON-RPC quantity, saturating at `u128::MAX`
pub(crate) fn parse_hex_quantity(value: &str) -> Result<u128, anyhow::Error> {
	let digits = value
		.strip_prefix("0x")
		.or_else(|| value.strip_prefix("0X"))
		.ok_or_else(|| anyhow::anyhow!("Quantity {} is missing the 0x prefix", value))?;
	if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
		return Err(anyhow::anyhow!("Invalid hex quantity: {}", value));
	}

	let significant = digits.trim_start_matches('0');
	if significant.len() > 32 {
		return Ok(u128::MAX);
	}
	if significant.is_empty() {
		return Ok(0);
	}
	Ok(u128::from_str_radix(significant, 16)?)
}
