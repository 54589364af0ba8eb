//! Recipient address normalization.
//!
//! Users paste recipients in three shapes: a bare address, a payment URI
//! (`solana:<address>?amount=..`, `ethereum:<address>@1?value=..`) or a link
//! whose last path segment is the address. This module reduces all three to a
//! candidate string and validates it against the chain's encoding. Everything
//! here is pure: no I/O, no logging side effects beyond the error constructors.

use thiserror::Error;
use url::Url;

use crate::models::{Address, Chain};

/// Errors produced while turning user input into an [`Address`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
	#[error("Address input is empty")]
	Empty,

	#[error("Invalid address format: {0}")]
	InvalidAddressFormat(String),
}

/// Extracts the address candidate from raw user input without validating it.
///
/// # Arguments
/// * `input` - Raw string as typed, pasted or scanned by the user
///
/// # Returns
/// * `Result<String, AddressError>` - The candidate, or `Empty` when nothing is left
pub fn extract_candidate(input: &str) -> Result<String, AddressError> {
	let raw = input.trim();
	if raw.is_empty() {
		return Err(AddressError::Empty);
	}

	let candidate = match Url::parse(raw) {
		Ok(url) if url.scheme() == "http" || url.scheme() == "https" => url
			.path_segments()
			.and_then(|segments| segments.filter(|s| !s.is_empty()).last())
			.map(|s| s.to_string())
			.unwrap_or_default(),
		Ok(url) => payment_uri_target(raw, &url),
		Err(_) => raw.to_string(),
	};

	let candidate = candidate.trim().to_string();
	if candidate.is_empty() {
		return Err(AddressError::Empty);
	}
	Ok(candidate)
}

/// Address part of a `<scheme>:<address>[@chain][/function][?query]` URI
fn payment_uri_target(raw: &str, url: &Url) -> String {
	// Non-hierarchical URIs keep the address as the path; `solana://addr` style
	// links carry it as the host instead.
	let target = match url.host_str() {
		Some(host) if !host.is_empty() => host.to_string(),
		_ => url.path().trim_start_matches('/').to_string(),
	};

	let target = if target.is_empty() {
		// Url refused to give us a path, fall back to plain string slicing
		let without_scheme = raw.split_once(':').map(|(_, rest)| rest).unwrap_or(raw);
		without_scheme.to_string()
	} else {
		target
	};

	target
		.split(['?', '#', '@', '/'])
		.next()
		.unwrap_or_default()
		.to_string()
}

/// Normalizes raw user input into a validated address for `chain`.
///
/// Literal inputs are stripped of characters outside the chain's alphabet
/// before validation, so stray quotes, spaces or zero-width characters copied
/// along with an address do not cause a rejection.
pub fn normalize(input: &str, chain: Chain) -> Result<Address, AddressError> {
	let candidate = extract_candidate(input)?;
	let sanitized: String = candidate
		.chars()
		.filter(|c| chain.is_address_char(*c))
		.collect();

	if sanitized.is_empty() {
		return Err(AddressError::InvalidAddressFormat(candidate));
	}

	Address::parse(&sanitized, chain)
}
