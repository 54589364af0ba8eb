//! Transfer request, outcome and receipt models used by the send workflow.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Address, Chain};

/// Share of the balance offered as "max" so that fees still fit
pub const MAX_SENDABLE_PERCENT: u32 = 99;

/// Token selected for a transfer. Only the chain's native token is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Token {
	#[default]
	Native,
}

impl Token {
	pub fn symbol(&self, chain: Chain) -> &'static str {
		match self {
			Token::Native => chain.native_symbol(),
		}
	}
}

/// A connected browser-extension wallet the user can send from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceWallet {
	/// Extension name, e.g. Phantom or MetaMask
	pub name: String,
	pub address: Address,
	/// Spendable balance in whole native tokens
	pub balance: Decimal,
}

impl SourceWallet {
	pub fn chain(&self) -> Chain {
		self.address.chain()
	}

	/// Largest amount the UI should offer as a one-click "max"
	pub fn max_sendable(&self) -> Decimal {
		max_sendable(self.balance)
	}
}

/// 99 % of a balance, leaving headroom for network fees
pub fn max_sendable(balance: Decimal) -> Decimal {
	if balance <= Decimal::ZERO {
		return Decimal::ZERO;
	}
	(balance * Decimal::from(MAX_SENDABLE_PERCENT) / Decimal::from(100)).normalize()
}

/// Everything the external signer needs to build and broadcast a transfer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
	pub from: SourceWallet,
	pub to: Address,
	pub amount: Decimal,
	pub token: Token,
}

/// Final state of a transfer attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TransferOutcome {
	/// Broadcast accepted by the ledger; carries the transaction signature/hash
	Succeeded { reference: String },
	/// Signing or broadcast failed; carries a sanitized error message
	Failed { reason: String },
}

/// Audit record handed to the receipt sink after a successful send
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
	pub user_id: String,
	pub transaction_signature: String,
	pub wallet_address: String,
	pub wallet_name: String,
	pub recipient_address: String,
	pub amount: Decimal,
	pub token: String,
	pub chain: Chain,
	pub status: String,
	pub created_at: DateTime<Utc>,
}

impl Receipt {
	pub fn for_transfer(user_id: &str, request: &TransferRequest, reference: &str) -> Self {
		Self {
			user_id: user_id.to_string(),
			transaction_signature: reference.to_string(),
			wallet_address: request.from.address.to_string(),
			wallet_name: request.from.name.clone(),
			recipient_address: request.to.to_string(),
			amount: request.amount,
			token: request.token.symbol(request.to.chain()).to_string(),
			chain: request.to.chain(),
			status: "success".to_string(),
			created_at: Utc::now(),
		}
	}
}
