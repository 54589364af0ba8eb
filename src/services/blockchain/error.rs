//! Ledger transport error types.
//!
//! Every failure to obtain a JSON-RPC result ends up here: connection
//! problems, unexpected HTTP status codes, unparseable bodies and JSON-RPC
//! `error` objects. Callers above the activity analyzer never see these; the
//! analyzer turns them into an `analyzed: false` result.

use log::error;
use reqwest::StatusCode;

/// Represents possible errors that can occur while talking to a ledger RPC endpoint
#[derive(Debug)]
pub enum TransportError {
	/// The request never produced a response (DNS, connect, timeout)
	Network(String),

	/// The endpoint answered with a non-success HTTP status
	Http {
		status: StatusCode,
		url: String,
		body: String,
	},

	/// Rotating to a fallback endpoint failed or was exhausted
	UrlRotation(String),

	/// The request body could not be serialized
	RequestSerialization(String),

	/// The response body was not the JSON we expected
	ResponseParse(String),

	/// The endpoint returned a JSON-RPC error object
	Rpc { code: i64, message: String },
}

impl TransportError {
	fn format_message(&self) -> String {
		match self {
			Self::Network(msg) => format!("Network error: {}", msg),
			Self::Http { status, url, body } => {
				format!("HTTP error {} from {}: {}", status.as_u16(), url, body)
			}
			Self::UrlRotation(msg) => format!("URL rotation error: {}", msg),
			Self::RequestSerialization(msg) => format!("Request serialization error: {}", msg),
			Self::ResponseParse(msg) => format!("Response parse error: {}", msg),
			Self::Rpc { code, message } => format!("RPC error {}: {}", code, message),
		}
	}

	fn logged(self) -> Self {
		error!("{}", self.format_message());
		self
	}

	pub fn network(msg: impl Into<String>) -> Self {
		Self::Network(msg.into()).logged()
	}

	pub fn http(status: StatusCode, url: impl Into<String>, body: impl Into<String>) -> Self {
		Self::Http {
			status,
			url: url.into(),
			body: body.into(),
		}
		.logged()
	}

	pub fn url_rotation(msg: impl Into<String>) -> Self {
		Self::UrlRotation(msg.into()).logged()
	}

	pub fn request_serialization(msg: impl Into<String>) -> Self {
		Self::RequestSerialization(msg.into()).logged()
	}

	pub fn response_parse(msg: impl Into<String>) -> Self {
		Self::ResponseParse(msg.into()).logged()
	}

	pub fn rpc(code: i64, message: impl Into<String>) -> Self {
		Self::Rpc {
			code,
			message: message.into(),
		}
		.logged()
	}

	/// HTTP status of the failed response, if there was one
	pub fn status(&self) -> Option<StatusCode> {
		match self {
			Self::Http { status, .. } => Some(*status),
			_ => None,
		}
	}
}

impl std::fmt::Display for TransportError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.format_message())
	}
}

impl std::error::Error for TransportError {}
