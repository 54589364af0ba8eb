use crate::properties::strategies::{
	abuse_report_strategy, activity_result_strategy, registry_result_strategy,
	solana_address_strategy,
};

use proptest::{prelude::*, test_runner::Config};
use wallet_guard::{
	models::{
		AbuseQueryResult, Address, Chain, ChainActivityResult, RiskLevel, Severity, UNSAFE_SCORE,
	},
	services::risk::{
		score_signals, NEW_EMPTY_WALLET_WEIGHT, REGISTRY_REPORT_WEIGHT, SUSPICIOUS_PATTERN_WEIGHT,
	},
};

fn address(value: &str) -> Address {
	Address::parse(value, Chain::Solana).unwrap()
}

proptest! {
	#![proptest_config(Config {
		failure_persistence: None,
		..Config::default()
	})]

	#[test]
	fn test_score_is_sum_of_raised_signals(
		value in solana_address_strategy(),
		registry in registry_result_strategy(),
		activity in activity_result_strategy(),
	) {
		let mut expected = 0;
		if !registry.safe {
			expected += REGISTRY_REPORT_WEIGHT;
		}
		if activity.suspicious_pattern {
			expected += SUSPICIOUS_PATTERN_WEIGHT;
		}
		if activity.is_new_wallet && !activity.has_balance {
			expected += NEW_EMPTY_WALLET_WEIGHT;
		}

		let verdict = score_signals(address(&value), registry, activity, None);
		prop_assert_eq!(verdict.risk_score(), expected);
		prop_assert!(verdict.risk_score() <= 100);
		prop_assert_eq!(verdict.risk_level(), RiskLevel::from_score(expected));
		prop_assert_eq!(verdict.safe(), expected < UNSAFE_SCORE);
		prop_assert!(!verdict.is_blocked());
		prop_assert!(verdict.blocklist_entry().is_none());
		prop_assert_eq!(verdict.address().as_str(), value.as_str());
	}

	#[test]
	fn test_registry_report_never_lowers_score(
		value in solana_address_strategy(),
		report in abuse_report_strategy(),
		activity in activity_result_strategy(),
	) {
		let clean = score_signals(
			address(&value),
			AbuseQueryResult::from_reports(Vec::new(), None),
			activity.clone(),
			None,
		);
		let reported = score_signals(
			address(&value),
			AbuseQueryResult::from_reports(vec![report], None),
			activity,
			None,
		);

		prop_assert!(reported.risk_score() > clean.risk_score());
		prop_assert!(!reported.safe());
		prop_assert!(reported
			.risk_factors()
			.iter()
			.any(|f| f.severity == Severity::Critical));
	}

	#[test]
	fn test_unavailable_sources_are_visible_but_not_scored(
		value in solana_address_strategy(),
		warning in "[a-z ]{1,30}",
		blocklist_error in proptest::option::of("[a-z ]{1,30}"),
	) {
		let verdict = score_signals(
			address(&value),
			AbuseQueryResult::unavailable(warning),
			ChainActivityResult::unavailable("ledger down"),
			blocklist_error.clone(),
		);

		prop_assert_eq!(verdict.risk_score(), 0);
		prop_assert!(verdict.safe());
		let medium = verdict
			.risk_factors()
			.iter()
			.filter(|f| f.severity == Severity::Medium)
			.count();
		prop_assert_eq!(medium, 1 + usize::from(blocklist_error.is_some()));
	}

	#[test]
	fn test_level_buckets(score in 0u32..200) {
		let level = RiskLevel::from_score(score);
		let expected = match score {
			s if s < 20 => RiskLevel::Low,
			s if s < 50 => RiskLevel::Medium,
			s if s < 80 => RiskLevel::High,
			_ => RiskLevel::Critical,
		};
		prop_assert_eq!(level, expected);
	}
}
