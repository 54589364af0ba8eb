//! On-chain activity snapshot and the heuristics derived from it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::Chain;

/// Transaction count above which a zero balance looks like a pass-through wallet
pub const SUSPICIOUS_TRANSACTION_COUNT: u64 = 50;

/// Raw activity as returned by the ledger, in the chain's smallest unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainActivitySnapshot {
	pub balance: u128,
	pub transaction_count: u64,
	pub recent_transaction_refs: Vec<String>,
}

/// Behavioral read-out of an address' activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainActivityResult {
	/// Balance in whole native tokens (SOL, ETH)
	pub balance: Decimal,
	pub transaction_count: u64,
	pub recent_transaction_refs: Vec<String>,
	pub is_new_wallet: bool,
	pub has_balance: bool,
	pub suspicious_pattern: bool,
	pub analyzed: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}

impl ChainActivityResult {
	/// Derives the heuristics from a fetched snapshot
	pub fn from_snapshot(chain: Chain, snapshot: ChainActivitySnapshot, max_refs: usize) -> Self {
		let ChainActivitySnapshot {
			balance,
			transaction_count,
			mut recent_transaction_refs,
		} = snapshot;
		recent_transaction_refs.truncate(max_refs);

		Self {
			balance: to_native_units(balance, chain),
			transaction_count,
			recent_transaction_refs,
			is_new_wallet: transaction_count == 0,
			has_balance: balance > 0,
			suspicious_pattern: transaction_count > SUSPICIOUS_TRANSACTION_COUNT && balance == 0,
			analyzed: true,
			error: None,
		}
	}

	/// Result used when the ledger could not be queried. No heuristic is raised:
	/// missing data is not evidence either way.
	pub fn unavailable(error: impl Into<String>) -> Self {
		Self {
			balance: Decimal::ZERO,
			transaction_count: 0,
			recent_transaction_refs: Vec::new(),
			is_new_wallet: false,
			has_balance: false,
			suspicious_pattern: false,
			analyzed: false,
			error: Some(error.into()),
		}
	}
}

/// Converts smallest units into whole tokens, saturating at Decimal's range
pub fn to_native_units(amount: u128, chain: Chain) -> Decimal {
	let scale = chain.native_decimals();
	match i128::try_from(amount)
		.ok()
		.and_then(|value| Decimal::try_from_i128_with_scale(value, scale).ok())
	{
		Some(value) => value.normalize(),
		None => Decimal::MAX,
	}
}
