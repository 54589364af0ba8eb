//! Community fraud reports.
//!
//! Users flag addresses they believe are fraudulent. One document exists per
//! reported address and accumulates every distinct reporter, the categories
//! they chose and any notes they left.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::models::{Address, Chain};

/// Kind of fraud a reporter observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportCategory {
	Phishing,
	Scam,
	Fraud,
	Others,
}

impl ReportCategory {
	pub const ALL: [ReportCategory; 4] = [Self::Phishing, Self::Scam, Self::Fraud, Self::Others];

	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Phishing => "Phishing",
			Self::Scam => "Scam",
			Self::Fraud => "Fraud",
			Self::Others => "Others",
		}
	}
}

impl fmt::Display for ReportCategory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for ReportCategory {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let wanted = s.trim();
		Self::ALL
			.into_iter()
			.find(|category| category.as_str().eq_ignore_ascii_case(wanted))
			.ok_or_else(|| format!("Unknown report category: {}", s))
	}
}

/// A note left by one reporter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReporterNote {
	pub reporter: String,
	pub note: String,
	pub timestamp: DateTime<Utc>,
}

/// Everything the community has reported about one address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FraudReport {
	pub wallet_address: String,
	pub chain: Chain,
	pub categories: Vec<ReportCategory>,
	pub reporters: Vec<String>,
	/// Number of distinct reporters
	pub frequency: u32,
	#[serde(default)]
	pub notes: Vec<ReporterNote>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl FraudReport {
	/// Creates a report document with no reporters yet
	pub fn new(address: &Address) -> Self {
		let now = Utc::now();
		Self {
			wallet_address: address.as_str().to_string(),
			chain: address.chain(),
			categories: Vec::new(),
			reporters: Vec::new(),
			frequency: 0,
			notes: Vec::new(),
			created_at: now,
			updated_at: now,
		}
	}

	pub fn is_for(&self, address: &Address) -> bool {
		self.chain == address.chain() && self.wallet_address == address.as_str()
	}

	pub fn has_reporter(&self, reporter: &str) -> bool {
		self.reporters.iter().any(|r| r == reporter)
	}

	/// Records one reporter's report. The caller rejects repeat reporters.
	pub fn add_report(&mut self, reporter: &str, category: ReportCategory, note: Option<&str>) {
		let now = Utc::now();
		self.reporters.push(reporter.to_string());
		if !self.categories.contains(&category) {
			self.categories.push(category);
		}
		if let Some(note) = note.map(str::trim).filter(|note| !note.is_empty()) {
			self.notes.push(ReporterNote {
				reporter: reporter.to_string(),
				note: note.to_string(),
				timestamp: now,
			});
		}
		self.frequency = u32::try_from(self.reporters.len()).unwrap_or(u32::MAX);
		self.updated_at = now;
	}
}
