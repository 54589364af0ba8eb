//! Send workflow error types.
//!
//! Every variant is a rejected user action: the workflow stays in the state it
//! was in and the message is shown next to the offending input.

use log::warn;
use rust_decimal::Decimal;
use std::fmt;

use crate::{models::RiskLevel, services::workflow::WorkflowStep, utils::AddressError};

#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowError {
	/// The recipient input could not be normalized into an address
	InvalidAddress(AddressError),

	/// No verdict has been computed for the current recipient
	NoVerdict,

	/// The verdict on hand was computed for a different recipient
	StaleVerdict,

	/// The verdict does not allow the transfer
	UnsafeVerdict { level: RiskLevel, score: u32 },

	/// No source wallet has been selected
	NoWallet,

	/// The source wallet is on a different chain than the recipient
	ChainMismatch(String),

	/// The amount is missing, zero or negative
	InvalidAmount(String),

	/// The amount exceeds the source wallet balance
	InsufficientBalance {
		requested: Decimal,
		available: Decimal,
	},

	/// The action is not available in the current step
	InvalidState {
		action: &'static str,
		step: WorkflowStep,
	},
}

impl WorkflowError {
	fn format_message(&self) -> String {
		match self {
			Self::InvalidAddress(e) => e.to_string(),
			Self::NoVerdict => "Recipient has not been checked yet".to_string(),
			Self::StaleVerdict => {
				"Recipient changed since the last check, please check it again".to_string()
			}
			Self::UnsafeVerdict { level, score } => format!(
				"Transfer blocked: recipient risk is {} (score {})",
				level, score
			),
			Self::NoWallet => "Select a wallet to send from".to_string(),
			Self::ChainMismatch(msg) => format!("Wallet cannot send to this recipient: {}", msg),
			Self::InvalidAmount(msg) => format!("Invalid amount: {}", msg),
			Self::InsufficientBalance {
				requested,
				available,
			} => format!(
				"Insufficient balance: requested {}, available {}",
				requested, available
			),
			Self::InvalidState { action, step } => {
				format!("Cannot {} while in the {} step", action, step)
			}
		}
	}

	fn logged(self) -> Self {
		warn!("{}", self.format_message());
		self
	}

	pub fn invalid_address(error: AddressError) -> Self {
		Self::InvalidAddress(error).logged()
	}

	pub fn no_verdict() -> Self {
		Self::NoVerdict.logged()
	}

	pub fn stale_verdict() -> Self {
		Self::StaleVerdict.logged()
	}

	pub fn unsafe_verdict(level: RiskLevel, score: u32) -> Self {
		Self::UnsafeVerdict { level, score }.logged()
	}

	pub fn no_wallet() -> Self {
		Self::NoWallet.logged()
	}

	pub fn chain_mismatch(msg: impl Into<String>) -> Self {
		Self::ChainMismatch(msg.into()).logged()
	}

	pub fn invalid_amount(msg: impl Into<String>) -> Self {
		Self::InvalidAmount(msg.into()).logged()
	}

	pub fn insufficient_balance(requested: Decimal, available: Decimal) -> Self {
		Self::InsufficientBalance {
			requested,
			available,
		}
		.logged()
	}

	pub fn invalid_state(action: &'static str, step: WorkflowStep) -> Self {
		Self::InvalidState { action, step }.logged()
	}
}

impl fmt::Display for WorkflowError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.format_message())
	}
}

impl std::error::Error for WorkflowError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Self::InvalidAddress(e) => Some(e),
			_ => None,
		}
	}
}
