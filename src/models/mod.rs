//! Domain models and data structures for recipient screening.
//!
//! This module contains all the core data structures used throughout the application:
//!
//! - `config`: Configuration loading and validation
//! - `core`: Core domain models (addresses, user records, signals, verdicts, transfers)

mod config;
mod core;

// Re-export core types
pub(crate) use core::VerdictParts;
pub use core::{
	max_sendable, to_native_units, AbuseQueryResult, AbuseReport, AddedBy, Address,
	BlocklistEntry, Chain, ChainActivityResult, ChainActivitySnapshot, FraudReport, Receipt,
	ReportCategory, ReporterNote, RiskFactor, RiskLevel, RiskVerdict, Severity, SourceWallet,
	Token, TransferOutcome, TransferRequest, TrustedContact, UserRecord, BASE58_ALPHABET,
	EVM_ADDRESS_BYTES, MAX_SENDABLE_PERCENT, SOLANA_ADDRESS_BYTES, SUSPICIOUS_TRANSACTION_COUNT,
	UNSAFE_SCORE,
};

// Re-export config types
pub use config::{
	ActivityConfig, AssessmentConfig, ChainConfig, ConfigError, ConfigLoader, GuardConfig,
	RegistryConfig, RegistryCredential, SecretValue, StorageConfig, DEFAULT_CONFIG_PATH,
};
