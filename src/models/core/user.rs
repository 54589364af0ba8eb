//! Per-user account document: blocklist and trusted contacts.
//!
//! Both lists live on the same record so that every mutation can bump a single
//! `last_updated` marker, which downstream collaborators use for sync.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a blocklist entry came to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddedBy {
	Manual,
	Auto,
}

/// An address the user explicitly refuses to send funds to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlocklistEntry {
	pub address: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub reason: Option<String>,
	pub blocked_at: DateTime<Utc>,
	pub added_by: AddedBy,
}

/// A saved recipient in the user's address book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustedContact {
	pub address: String,
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub notes: Option<String>,
	pub added_at: DateTime<Utc>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub updated_at: Option<DateTime<Utc>>,
}

/// The document owning a user's lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
	pub user_id: String,
	#[serde(default)]
	pub blocklist: Vec<BlocklistEntry>,
	#[serde(default)]
	pub trusted_contacts: Vec<TrustedContact>,
	pub created_at: DateTime<Utc>,
	pub last_updated: DateTime<Utc>,
}

impl UserRecord {
	/// Creates an empty record stamped with the current time
	pub fn new(user_id: impl Into<String>) -> Self {
		let now = Utc::now();
		Self {
			user_id: user_id.into(),
			blocklist: Vec::new(),
			trusted_contacts: Vec::new(),
			created_at: now,
			last_updated: now,
		}
	}

	pub fn blocklist_entry(&self, address: &str) -> Option<&BlocklistEntry> {
		self.blocklist.iter().find(|entry| entry.address == address)
	}

	pub fn contact(&self, address: &str) -> Option<&TrustedContact> {
		self.trusted_contacts
			.iter()
			.find(|contact| contact.address == address)
	}

	/// Marks the record as modified
	pub fn touch(&mut self) {
		self.last_updated = Utc::now();
	}
}
