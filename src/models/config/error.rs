//! Configuration error types.
//!
//! Raised while reading the guard configuration document or wiring clients
//! from it. None of these are recoverable at runtime: the CLI reports them and
//! exits.

use log::error;
use std::{error::Error, fmt, io::ErrorKind};

use crate::models::Chain;

/// Errors that can occur during configuration operations
#[derive(Debug)]
#[allow(clippy::enum_variant_names)]
pub enum ConfigError {
	/// The document parsed but a value is out of range or inconsistent
	ValidationError(String),

	/// The document is not valid JSON or does not match the schema
	ParseError(String),

	/// The document could not be read
	FileError(String),

	/// A command asked for a chain the document has no section for
	ChainNotConfigured(Chain),
}

impl ConfigError {
	fn format_message(&self) -> String {
		match self {
			Self::ValidationError(msg) => format!("Invalid configuration: {}", msg),
			Self::ParseError(msg) => format!("Malformed configuration: {}", msg),
			Self::FileError(msg) => format!("Cannot read configuration: {}", msg),
			Self::ChainNotConfigured(chain) => {
				format!("No chain section configured for {}", chain)
			}
		}
	}

	fn logged(self) -> Self {
		error!("{}", self.format_message());
		self
	}

	pub fn validation_error(msg: impl Into<String>) -> Self {
		Self::ValidationError(msg.into()).logged()
	}

	pub fn parse_error(msg: impl Into<String>) -> Self {
		Self::ParseError(msg.into()).logged()
	}

	pub fn file_error(msg: impl Into<String>) -> Self {
		Self::FileError(msg.into()).logged()
	}

	pub fn chain_not_configured(chain: Chain) -> Self {
		Self::ChainNotConfigured(chain).logged()
	}
}

impl fmt::Display for ConfigError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.format_message())
	}
}

impl Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
	fn from(err: std::io::Error) -> Self {
		match err.kind() {
			ErrorKind::NotFound => Self::file_error("file does not exist"),
			ErrorKind::PermissionDenied => Self::file_error("permission denied"),
			_ => Self::file_error(err.to_string()),
		}
	}
}

impl From<serde_json::Error> for ConfigError {
	fn from(err: serde_json::Error) -> Self {
		// Line and column are enough to find the problem; the message never
		// echoes secret values back
		Self::parse_error(format!(
			"{:?} error at line {}, column {}",
			err.classify(),
			err.line(),
			err.column()
		))
	}
}
