//! Registry response envelopes.
//!
//! The registry has been observed answering with three different shapes for
//! the same query. Exactly these three are accepted; anything else is an
//! error rather than an empty result.

use serde::Deserialize;

use crate::models::AbuseReport;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RegistryEnvelope {
	/// `{"reports": [...], "total": n}`
	Reports {
		reports: Vec<AbuseReport>,
		#[serde(default)]
		total: Option<u64>,
	},
	/// `{"data": [...], "total": n}`
	Data {
		data: Vec<AbuseReport>,
		#[serde(default)]
		total: Option<u64>,
	},
	/// `[...]`
	Bare(Vec<AbuseReport>),
}

/// Reports and the registry's total count, when it sent one
#[derive(Debug, PartialEq)]
pub struct ParsedReports {
	pub reports: Vec<AbuseReport>,
	pub total: Option<u64>,
}

/// Parses any of the accepted envelope shapes
pub fn parse_envelope(body: &[u8]) -> Result<ParsedReports, serde_json::Error> {
	let parsed = match serde_json::from_slice::<RegistryEnvelope>(body)? {
		RegistryEnvelope::Reports { reports, total } => ParsedReports { reports, total },
		RegistryEnvelope::Data { data, total } => ParsedReports {
			reports: data,
			total,
		},
		RegistryEnvelope::Bare(reports) => ParsedReports {
			reports,
			total: None,
		},
	};
	Ok(parsed)
}
