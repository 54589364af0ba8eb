//! Risk assessment.
//!
//! - `aggregator`: orchestrates the blocklist, registry and activity sources
//! - `scoring`: the fixed scoring policy building verdicts from their signals

mod aggregator;
mod scoring;

pub use aggregator::RiskAggregator;
pub use scoring::{
	blocked_verdict, failed_verdict, score_signals, BLOCKED_SCORE, BLOCKLIST_REASON,
	BLOCKLIST_UNVERIFIED_REASON, FAILED_ASSESSMENT_REASON, FAILED_ASSESSMENT_SCORE,
	NEW_EMPTY_WALLET_WEIGHT, NEW_WALLET_REASON, REGISTRY_REPORT_WEIGHT,
	REGISTRY_UNVERIFIED_REASON, SUSPICIOUS_PATTERN_REASON, SUSPICIOUS_PATTERN_WEIGHT,
};
