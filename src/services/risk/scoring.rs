//! Scoring policy.
//!
//! Pure functions turning collected signals into a [`RiskVerdict`]. Every
//! signal adds a fixed non-negative weight; nothing lowers a score.

use serde_json::{json, Value};

use crate::models::{
	AbuseQueryResult, Address, BlocklistEntry, ChainActivityResult, RiskFactor, RiskLevel,
	RiskVerdict, Severity, VerdictParts, UNSAFE_SCORE,
};

/// Weight of at least one registry report
pub const REGISTRY_REPORT_WEIGHT: u32 = 80;
/// Weight of the high-churn, zero-balance pattern
pub const SUSPICIOUS_PATTERN_WEIGHT: u32 = 30;
/// Weight of a wallet with no history and no funds
pub const NEW_EMPTY_WALLET_WEIGHT: u32 = 10;
/// Score reported for blocklisted addresses
pub const BLOCKED_SCORE: u32 = 100;
/// Score reported when the assessment itself broke
pub const FAILED_ASSESSMENT_SCORE: u32 = 50;

pub const BLOCKLIST_REASON: &str = "Address is in your blocklist";
pub const REGISTRY_UNVERIFIED_REASON: &str = "Unable to verify address against fraud database";
pub const BLOCKLIST_UNVERIFIED_REASON: &str = "Unable to check address against your blocklist";
pub const SUSPICIOUS_PATTERN_REASON: &str = "Suspicious transaction pattern detected";
pub const NEW_WALLET_REASON: &str = "New wallet with no activity";
pub const FAILED_ASSESSMENT_REASON: &str = "Unable to complete risk assessment";

fn or_default(value: Option<&String>, default: &str) -> String {
	value
		.filter(|v| !v.is_empty())
		.cloned()
		.unwrap_or_else(|| default.to_string())
}

fn report_factor(registry: &AbuseQueryResult) -> Option<RiskFactor> {
	if registry.safe {
		return None;
	}
	let report = registry.first_report()?;
	let category = if report.category.is_empty() {
		"Unknown category"
	} else {
		report.category.as_str()
	};

	Some(RiskFactor::new(
		Severity::Critical,
		format!("Reported for fraud/scam: {}", category),
		json!({
			"category": category,
			"subcategory": or_default(report.subcategory.as_ref(), "N/A"),
			"description": or_default(report.description.as_ref(), "No description"),
			"reporter": or_default(report.reporter.as_ref(), "Anonymous"),
			"reportedAt": or_default(report.reported_at.as_ref(), "Unknown date"),
			"totalReports": registry.total_reports,
		}),
	))
}

/// Scores the registry and activity results of a non-blocklisted address.
///
/// `blocklist_error` is the storage failure, if any, that prevented the
/// blocklist check; it is reported as a medium factor without adding score.
pub fn score_signals(
	address: Address,
	registry: AbuseQueryResult,
	activity: ChainActivityResult,
	blocklist_error: Option<String>,
) -> RiskVerdict {
	let mut score = 0u32;
	let mut factors = Vec::new();

	if let Some(error) = blocklist_error {
		factors.push(RiskFactor::new(
			Severity::Medium,
			BLOCKLIST_UNVERIFIED_REASON,
			Value::String(error),
		));
	}

	if let Some(factor) = report_factor(&registry) {
		score += REGISTRY_REPORT_WEIGHT;
		factors.push(factor);
	} else if !registry.checked {
		factors.push(RiskFactor::new(
			Severity::Medium,
			REGISTRY_UNVERIFIED_REASON,
			Value::String(
				registry
					.warning
					.clone()
					.unwrap_or_else(|| "Abuse registry check failed".to_string()),
			),
		));
	}

	if activity.suspicious_pattern {
		score += SUSPICIOUS_PATTERN_WEIGHT;
		factors.push(RiskFactor::new(
			Severity::Medium,
			SUSPICIOUS_PATTERN_REASON,
			json!("High activity with zero balance"),
		));
	}

	if activity.is_new_wallet && !activity.has_balance {
		score += NEW_EMPTY_WALLET_WEIGHT;
		factors.push(RiskFactor::new(
			Severity::Low,
			NEW_WALLET_REASON,
			json!("Exercise caution with new wallets"),
		));
	}

	RiskVerdict::from_parts(VerdictParts {
		address,
		safe: score < UNSAFE_SCORE,
		risk_score: score,
		risk_level: RiskLevel::from_score(score),
		risk_factors: factors,
		is_blocked: false,
		blocklist_entry: None,
		abuse_registry_result: Some(registry),
		chain_activity_result: Some(activity),
	})
}

/// Verdict for an address on the user's blocklist. No other source is consulted.
pub fn blocked_verdict(address: Address, entry: BlocklistEntry) -> RiskVerdict {
	let details = json!({
		"reason": entry.reason,
		"blockedAt": entry.blocked_at,
		"addedBy": entry.added_by,
	});

	RiskVerdict::from_parts(VerdictParts {
		address,
		safe: false,
		risk_score: BLOCKED_SCORE,
		risk_level: RiskLevel::Blocked,
		risk_factors: vec![RiskFactor::new(Severity::Critical, BLOCKLIST_REASON, details)],
		is_blocked: true,
		blocklist_entry: Some(entry),
		abuse_registry_result: None,
		chain_activity_result: None,
	})
}

/// Fail-closed verdict for an assessment that broke unexpectedly
pub fn failed_verdict(address: Address, error: &str) -> RiskVerdict {
	RiskVerdict::from_parts(VerdictParts {
		address,
		safe: false,
		risk_score: FAILED_ASSESSMENT_SCORE,
		risk_level: RiskLevel::Unknown,
		risk_factors: vec![RiskFactor::new(
			Severity::Medium,
			FAILED_ASSESSMENT_REASON,
			Value::String(error.to_string()),
		)],
		is_blocked: false,
		blocklist_entry: None,
		abuse_registry_result: None,
		chain_activity_result: None,
	})
}
