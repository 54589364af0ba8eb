//! Abuse registry report models.

use serde::{Deserialize, Deserializer, Serialize};

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// One fraud report filed against an address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbuseReport {
	#[serde(default, deserialize_with = "null_as_empty")]
	pub category: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub subcategory: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub reporter: Option<String>,
	#[serde(
		default,
		alias = "created_at",
		alias = "createdAt",
		skip_serializing_if = "Option::is_none"
	)]
	pub reported_at: Option<String>,
}

/// Outcome of asking the abuse registry about an address.
///
/// `checked == false` always comes with `degraded == true` and a warning: the
/// registry could not be consulted, which is not the same as a clean result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbuseQueryResult {
	pub checked: bool,
	pub safe: bool,
	pub reports: Vec<AbuseReport>,
	pub total_reports: u64,
	pub degraded: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub warning: Option<String>,
}

impl AbuseQueryResult {
	/// Result of a successful lookup
	pub fn from_reports(reports: Vec<AbuseReport>, total: Option<u64>) -> Self {
		let total_reports = total.unwrap_or(reports.len() as u64);
		Self {
			checked: true,
			safe: reports.is_empty(),
			reports,
			total_reports,
			degraded: false,
			warning: None,
		}
	}

	/// Result used when the registry could not be consulted
	pub fn unavailable(warning: impl Into<String>) -> Self {
		Self {
			checked: false,
			safe: true,
			reports: Vec::new(),
			total_reports: 0,
			degraded: true,
			warning: Some(warning.into()),
		}
	}

	pub fn first_report(&self) -> Option<&AbuseReport> {
		self.reports.first()
	}
}
