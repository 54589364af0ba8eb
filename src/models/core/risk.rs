//! Risk verdict models.
//!
//! A [`RiskVerdict`] is built once by the scoring policy in
//! [`crate::services::risk`] and never mutated afterwards; re-checking an
//! address produces a new value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{AbuseQueryResult, Address, BlocklistEntry, ChainActivityResult};

/// Score at or above which a verdict is considered unsafe
pub const UNSAFE_SCORE: u32 = 50;

/// Severity of a single contributing signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
	Low,
	Medium,
	High,
	Critical,
}

/// Discrete risk bucket shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
	#[serde(rename = "low")]
	Low,
	#[serde(rename = "medium")]
	Medium,
	#[serde(rename = "high")]
	High,
	#[serde(rename = "critical")]
	Critical,
	/// The address is on the user's blocklist
	#[serde(rename = "BLOCKED")]
	Blocked,
	/// The assessment itself failed unexpectedly
	#[serde(rename = "unknown")]
	Unknown,
}

impl RiskLevel {
	/// Maps a score onto its bucket: `<20` low, `20..50` medium, `50..80` high,
	/// `>=80` critical.
	pub fn from_score(score: u32) -> Self {
		match score {
			0..=19 => RiskLevel::Low,
			20..=49 => RiskLevel::Medium,
			50..=79 => RiskLevel::High,
			_ => RiskLevel::Critical,
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			RiskLevel::Low => "low",
			RiskLevel::Medium => "medium",
			RiskLevel::High => "high",
			RiskLevel::Critical => "critical",
			RiskLevel::Blocked => "BLOCKED",
			RiskLevel::Unknown => "unknown",
		}
	}
}

impl std::fmt::Display for RiskLevel {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

/// One signal behind a verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
	pub severity: Severity,
	pub reason: String,
	#[serde(default)]
	pub details: Value,
}

impl RiskFactor {
	pub fn new(severity: Severity, reason: impl Into<String>, details: Value) -> Self {
		Self {
			severity,
			reason: reason.into(),
			details,
		}
	}
}

/// The aggregator's answer for one address
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskVerdict {
	address: Address,
	safe: bool,
	risk_score: u32,
	risk_level: RiskLevel,
	risk_factors: Vec<RiskFactor>,
	is_blocked: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	blocklist_entry: Option<BlocklistEntry>,
	#[serde(skip_serializing_if = "Option::is_none")]
	abuse_registry_result: Option<AbuseQueryResult>,
	#[serde(skip_serializing_if = "Option::is_none")]
	chain_activity_result: Option<ChainActivityResult>,
	recommendation: String,
	timestamp: DateTime<Utc>,
}

/// Fields of a verdict, assembled by the scoring policy
pub(crate) struct VerdictParts {
	pub address: Address,
	pub safe: bool,
	pub risk_score: u32,
	pub risk_level: RiskLevel,
	pub risk_factors: Vec<RiskFactor>,
	pub is_blocked: bool,
	pub blocklist_entry: Option<BlocklistEntry>,
	pub abuse_registry_result: Option<AbuseQueryResult>,
	pub chain_activity_result: Option<ChainActivityResult>,
}

impl RiskVerdict {
	pub(crate) fn from_parts(parts: VerdictParts) -> Self {
		// A blocked address is never safe, whatever the score says
		let safe = parts.safe && !parts.is_blocked;
		let recommendation = if safe {
			"Transaction can proceed"
		} else {
			"Transaction should be blocked"
		};

		Self {
			address: parts.address,
			safe,
			risk_score: parts.risk_score,
			risk_level: parts.risk_level,
			risk_factors: parts.risk_factors,
			is_blocked: parts.is_blocked,
			blocklist_entry: parts.blocklist_entry,
			abuse_registry_result: parts.abuse_registry_result,
			chain_activity_result: parts.chain_activity_result,
			recommendation: recommendation.to_string(),
			timestamp: Utc::now(),
		}
	}

	/// The address this verdict was computed for
	pub fn address(&self) -> &Address {
		&self.address
	}

	pub fn safe(&self) -> bool {
		self.safe
	}

	pub fn risk_score(&self) -> u32 {
		self.risk_score
	}

	pub fn risk_level(&self) -> RiskLevel {
		self.risk_level
	}

	pub fn risk_factors(&self) -> &[RiskFactor] {
		&self.risk_factors
	}

	pub fn is_blocked(&self) -> bool {
		self.is_blocked
	}

	pub fn blocklist_entry(&self) -> Option<&BlocklistEntry> {
		self.blocklist_entry.as_ref()
	}

	pub fn abuse_registry_result(&self) -> Option<&AbuseQueryResult> {
		self.abuse_registry_result.as_ref()
	}

	pub fn chain_activity_result(&self) -> Option<&ChainActivityResult> {
		self.chain_activity_result.as_ref()
	}

	pub fn recommendation(&self) -> &str {
		&self.recommendation
	}

	pub fn timestamp(&self) -> DateTime<Utc> {
		self.timestamp
	}

	/// Whether this verdict lets a transfer to `address` go ahead
	pub fn authorizes(&self, address: &Address) -> bool {
		self.safe && !self.is_blocked && &self.address == address
	}
}
