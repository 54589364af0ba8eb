//! Error types for repository operations.
//!
//! This module defines the error types that can occur while reading or
//! mutating user records: storage failures, conflicting inserts and invalid
//! input. Conflicts are user-facing validation messages; storage failures are
//! infrastructure problems callers must not mistake for data.

use log::error;
use std::error::Error;
use std::fmt;

/// Errors that can occur during repository operations
#[derive(Debug)]
pub enum RepositoryError {
	/// The entry already exists for this user (e.g. address already blocked)
	DuplicateEntry(String),

	/// Error that occurs when input fails validation before being stored
	ValidationError(String),

	/// Error that occurs when reading a record from storage
	LoadError(String),

	/// Error that occurs when writing a record to storage
	SaveError(String),

	/// Error that occurs due to internal repository operations
	InternalError(String),
}

impl RepositoryError {
	/// Format an error message for display
	///
	/// Creates a human-readable error message based on the error type.
	fn format_message(&self) -> String {
		match self {
			Self::DuplicateEntry(msg) => format!("Duplicate entry: {}", msg),
			Self::ValidationError(msg) => format!("Validation error: {}", msg),
			Self::LoadError(msg) => format!("Load error: {}", msg),
			Self::SaveError(msg) => format!("Save error: {}", msg),
			Self::InternalError(msg) => format!("Internal error: {}", msg),
		}
	}

	/// Create a new duplicate entry error
	///
	/// Conflicts are expected user input, so they are logged at warn level.
	pub fn duplicate_entry(msg: impl Into<String>) -> Self {
		let error = Self::DuplicateEntry(msg.into());
		log::warn!("{}", error.format_message());
		error
	}

	/// Create a new validation error with the given message
	pub fn validation_error(msg: impl Into<String>) -> Self {
		let error = Self::ValidationError(msg.into());
		log::warn!("{}", error.format_message());
		error
	}

	/// Create a new load error with the given message
	///
	/// Also logs the error message at the error level.
	pub fn load_error(msg: impl Into<String>) -> Self {
		let error = Self::LoadError(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Create a new save error with the given message
	///
	/// Also logs the error message at the error level.
	pub fn save_error(msg: impl Into<String>) -> Self {
		let error = Self::SaveError(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Create a new internal error with the given message
	///
	/// Also logs the error message at the error level.
	pub fn internal_error(msg: impl Into<String>) -> Self {
		let error = Self::InternalError(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Whether the error comes from the storage backend rather than user input
	pub fn is_storage_failure(&self) -> bool {
		matches!(
			self,
			Self::LoadError(_) | Self::SaveError(_) | Self::InternalError(_)
		)
	}
}

impl fmt::Display for RepositoryError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.format_message())
	}
}

impl Error for RepositoryError {}

impl From<std::io::Error> for RepositoryError {
	fn from(err: std::io::Error) -> Self {
		Self::load_error(err.to_string())
	}
}

impl From<serde_json::Error> for RepositoryError {
	fn from(err: serde_json::Error) -> Self {
		Self::load_error(format!("Malformed document: {}", err))
	}
}
