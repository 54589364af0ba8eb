//! Chain identifiers and validated ledger addresses.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::AddressError;

/// Number of bytes a Solana public key decodes to.
pub const SOLANA_ADDRESS_BYTES: usize = 32;

/// Number of bytes an Ethereum account address decodes to.
pub const EVM_ADDRESS_BYTES: usize = 20;

/// Base58 alphabet used by Solana-style addresses
pub const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Ledgers the guard knows how to screen addresses for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
	Solana,
	Ethereum,
}

impl Chain {
	/// Human-readable chain name, also used as the key of the registry alias map
	pub fn name(&self) -> &'static str {
		match self {
			Chain::Solana => "solana",
			Chain::Ethereum => "ethereum",
		}
	}

	/// Ticker of the native token
	pub fn native_symbol(&self) -> &'static str {
		match self {
			Chain::Solana => "SOL",
			Chain::Ethereum => "ETH",
		}
	}

	/// Decimals between the smallest unit (lamports, wei) and one native token
	pub fn native_decimals(&self) -> u32 {
		match self {
			Chain::Solana => 9,
			Chain::Ethereum => 18,
		}
	}

	/// Default code the abuse registry uses for this chain
	pub fn default_registry_code(&self) -> &'static str {
		match self {
			Chain::Solana => "SOL",
			Chain::Ethereum => "ETH",
		}
	}

	/// Whether a character can appear in a literal address of this chain
	pub fn is_address_char(&self, c: char) -> bool {
		match self {
			Chain::Solana => BASE58_ALPHABET.contains(c),
			Chain::Ethereum => c.is_ascii_hexdigit() || c == 'x' || c == 'X',
		}
	}
}

impl fmt::Display for Chain {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.name())
	}
}

impl std::str::FromStr for Chain {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"solana" | "sol" => Ok(Chain::Solana),
			"ethereum" | "eth" | "evm" => Ok(Chain::Ethereum),
			other => Err(format!("Unsupported chain: {}", other)),
		}
	}
}

/// A ledger address that has passed the chain's decoding rules.
///
/// Values can only be obtained through [`Address::parse`] or the normalizer in
/// [`crate::utils::address`], so holding one means the string decoded to the
/// chain's fixed byte length.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawAddress")]
pub struct Address {
	chain: Chain,
	value: String,
}

impl Address {
	/// Validates a candidate string against the chain's address encoding.
	///
	/// Ethereum addresses are canonicalized to lowercase hex so that the same
	/// account always compares equal regardless of checksum casing.
	pub fn parse(candidate: &str, chain: Chain) -> Result<Self, AddressError> {
		let candidate = candidate.trim();
		if candidate.is_empty() {
			return Err(AddressError::Empty);
		}

		match chain {
			Chain::Solana => {
				let bytes = bs58::decode(candidate).into_vec().map_err(|e| {
					AddressError::InvalidAddressFormat(format!("{}: {}", candidate, e))
				})?;
				if bytes.len() != SOLANA_ADDRESS_BYTES {
					return Err(AddressError::InvalidAddressFormat(format!(
						"{} decodes to {} bytes, expected {}",
						candidate,
						bytes.len(),
						SOLANA_ADDRESS_BYTES
					)));
				}
				Ok(Self {
					chain,
					value: candidate.to_string(),
				})
			}
			Chain::Ethereum => {
				let hex_part = candidate
					.strip_prefix("0x")
					.or_else(|| candidate.strip_prefix("0X"))
					.ok_or_else(|| {
						AddressError::InvalidAddressFormat(format!(
							"{} is missing the 0x prefix",
							candidate
						))
					})?;
				let bytes = hex::decode(hex_part).map_err(|e| {
					AddressError::InvalidAddressFormat(format!("{}: {}", candidate, e))
				})?;
				if bytes.len() != EVM_ADDRESS_BYTES {
					return Err(AddressError::InvalidAddressFormat(format!(
						"{} decodes to {} bytes, expected {}",
						candidate,
						bytes.len(),
						EVM_ADDRESS_BYTES
					)));
				}
				Ok(Self {
					chain,
					value: format!("0x{}", hex_part.to_ascii_lowercase()),
				})
			}
		}
	}

	pub fn chain(&self) -> Chain {
		self.chain
	}

	pub fn as_str(&self) -> &str {
		&self.value
	}

	/// Shortened form for log lines
	pub fn short(&self) -> String {
		if self.value.len() <= 12 {
			return self.value.clone();
		}
		format!(
			"{}...{}",
			&self.value[..6],
			&self.value[self.value.len() - 4..]
		)
	}
}

/// Unvalidated wire form, re-checked on deserialization
#[derive(Deserialize)]
struct RawAddress {
	chain: Chain,
	value: String,
}

impl TryFrom<RawAddress> for Address {
	type Error = AddressError;

	fn try_from(raw: RawAddress) -> Result<Self, Self::Error> {
		Address::parse(&raw.value, raw.chain)
	}
}

impl fmt::Display for Address {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.value)
	}
}

impl AsRef<str> for Address {
	fn as_ref(&self) -> &str {
		&self.value
	}
}
