//! Core domain models for recipient screening.
//!
//! This module contains the fundamental data structures that represent:
//! - Addresses: Validated ledger identifiers per chain
//! - User records: Blocklist entries and trusted contacts
//! - Reports: Community fraud reports per address
//! - Signals: Abuse registry reports and on-chain activity
//! - Verdicts: Scored risk assessments gating a transfer
//! - Transfers: Requests, outcomes and receipts of the send workflow

mod abuse;
mod activity;
mod address;
mod report;
mod risk;
mod transfer;
mod user;

pub use abuse::{AbuseQueryResult, AbuseReport};
pub use activity::{
	to_native_units, ChainActivityResult, ChainActivitySnapshot, SUSPICIOUS_TRANSACTION_COUNT,
};
pub use address::{Address, Chain, BASE58_ALPHABET, EVM_ADDRESS_BYTES, SOLANA_ADDRESS_BYTES};
pub use report::{FraudReport, ReportCategory, ReporterNote};
pub(crate) use risk::VerdictParts;
pub use risk::{RiskFactor, RiskLevel, RiskVerdict, Severity, UNSAFE_SCORE};
pub use transfer::{
	max_sendable, Receipt, SourceWallet, Token, TransferOutcome, TransferRequest,
	MAX_SENDABLE_PERCENT,
};
pub use user::{AddedBy, BlocklistEntry, TrustedContact, UserRecord};
