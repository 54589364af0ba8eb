//! Abuse registry error types.
//!
//! These never reach the caller of [`crate::services::registry::AbuseRegistry::query`]:
//! the client turns each of them into a degraded `AbuseQueryResult` whose
//! warning comes from [`RegistryError::warning`].

use log::warn;
use std::fmt;

#[derive(Debug)]
pub enum RegistryError {
	/// The registry could not be reached
	Network(String),

	/// No answer within the configured bound
	Timeout(u64),

	/// The registry rejected the credential (401/403)
	Authentication(u16),

	/// Any other non-success status
	Http(u16),

	/// The body matched none of the known envelope shapes
	UnrecognizedEnvelope(String),

	/// The client could not be built or the request could not be formed
	Configuration(String),
}

impl RegistryError {
	fn format_message(&self) -> String {
		match self {
			Self::Network(msg) => format!("Registry network error: {}", msg),
			Self::Timeout(ms) => format!("Registry did not answer within {} ms", ms),
			Self::Authentication(status) => {
				format!("Registry rejected credentials (status {})", status)
			}
			Self::Http(status) => format!("Registry returned status {}", status),
			Self::UnrecognizedEnvelope(msg) => {
				format!("Unrecognized registry response: {}", msg)
			}
			Self::Configuration(msg) => format!("Registry client configuration error: {}", msg),
		}
	}

	// Absorbed into a degraded result, so warn rather than error
	fn logged(self) -> Self {
		warn!("{}", self.format_message());
		self
	}

	pub fn network(msg: impl Into<String>) -> Self {
		Self::Network(msg.into()).logged()
	}

	pub fn timeout(after_ms: u64) -> Self {
		Self::Timeout(after_ms).logged()
	}

	pub fn authentication(status: u16) -> Self {
		Self::Authentication(status).logged()
	}

	pub fn http(status: u16) -> Self {
		Self::Http(status).logged()
	}

	pub fn unrecognized_envelope(msg: impl Into<String>) -> Self {
		Self::UnrecognizedEnvelope(msg.into()).logged()
	}

	pub fn configuration(msg: impl Into<String>) -> Self {
		Self::Configuration(msg.into()).logged()
	}

	/// Text shown to the user next to a degraded verdict
	pub fn warning(&self) -> String {
		match self {
			Self::Network(_) | Self::Timeout(_) | Self::Http(_) => {
				"Address verification service is currently unavailable. Please verify the recipient manually.".to_string()
			}
			Self::Authentication(_) => {
				"Address verification service rejected our credentials. Please verify the recipient manually.".to_string()
			}
			Self::UnrecognizedEnvelope(_) => {
				"Address verification service returned an unexpected response. Please verify the recipient manually.".to_string()
			}
			Self::Configuration(_) => {
				"Address verification is not configured. Please verify the recipient manually.".to_string()
			}
		}
	}
}

impl fmt::Display for RegistryError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.format_message())
	}
}

impl std::error::Error for RegistryError {}
