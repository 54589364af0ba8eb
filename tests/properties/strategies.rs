use proptest::{option, prelude::*};
use wallet_guard::models::{
	AbuseQueryResult, AbuseReport, Chain, ChainActivityResult, ChainActivitySnapshot,
};

const MAX_REPORTS: usize = 5;
const MAX_RECENT_REFS: usize = 5;

/// Base58 text of 32 random bytes, as a Solana public key
pub fn solana_address_strategy() -> impl Strategy<Value = String> {
	prop::collection::vec(any::<u8>(), 32).prop_map(|bytes| bs58::encode(bytes).into_string())
}

/// `0x`-prefixed hex of 20 random bytes with random letter casing
pub fn evm_address_strategy() -> impl Strategy<Value = String> {
	(
		prop::collection::vec(any::<u8>(), 20),
		prop::collection::vec(any::<bool>(), 40),
	)
		.prop_map(|(bytes, upper)| {
			let hex: String = hex::encode(bytes)
				.chars()
				.zip(upper)
				.map(|(c, upper)| if upper { c.to_ascii_uppercase() } else { c })
				.collect();
			format!("0x{}", hex)
		})
}

pub fn user_id_strategy() -> impl Strategy<Value = String> {
	"[a-zA-Z0-9_@.-]{1,24}".prop_map(|s| s.to_string())
}

pub fn abuse_report_strategy() -> impl Strategy<Value = AbuseReport> {
	(
		"[A-Za-z ]{0,20}",
		option::of("[A-Za-z ]{1,20}"),
		option::of("[A-Za-z ]{1,40}"),
	)
		.prop_map(|(category, subcategory, description)| AbuseReport {
			category,
			subcategory,
			description,
			reporter: None,
			reported_at: None,
		})
}

/// Registry answers: reports (possibly none) or an unreachable registry
pub fn registry_result_strategy() -> impl Strategy<Value = AbuseQueryResult> {
	prop_oneof![
		(
			prop::collection::vec(abuse_report_strategy(), 0..MAX_REPORTS),
			option::of(0u64..1_000),
		)
			.prop_map(|(reports, total)| AbuseQueryResult::from_reports(reports, total)),
		"[a-z ]{1,30}".prop_map(AbuseQueryResult::unavailable),
	]
}

pub fn activity_result_strategy() -> impl Strategy<Value = ChainActivityResult> {
	prop_oneof![
		(
			prop_oneof![Just(0u128), 1u128..10_000_000_000],
			prop_oneof![Just(0u64), 1u64..200],
			prop::collection::vec("[1-9A-HJ-NP-Za-km-z]{20,40}", 0..MAX_RECENT_REFS),
		)
			.prop_map(|(balance, transaction_count, recent_transaction_refs)| {
				ChainActivityResult::from_snapshot(
					Chain::Solana,
					ChainActivitySnapshot {
						balance,
						transaction_count,
						recent_transaction_refs,
					},
					MAX_RECENT_REFS,
				)
			}),
		"[a-z ]{1,30}".prop_map(ChainActivityResult::unavailable),
	]
}
