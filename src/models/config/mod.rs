//! Configuration loading and validation.
//!
//! The guard is configured from a single JSON document describing the abuse
//! registry, the ledger RPC endpoints per chain and the assessment tunables.
//! Secrets are opaque values injected through the document or the environment;
//! nothing in the core carries a default credential.

use std::path::Path;

mod error;
mod guard_config;

pub use error::ConfigError;
pub use guard_config::{
	ActivityConfig, AssessmentConfig, ChainConfig, GuardConfig, RegistryConfig,
	RegistryCredential, SecretValue, StorageConfig, DEFAULT_CONFIG_PATH,
};

/// Common interface for loading configuration files
pub trait ConfigLoader: Sized {
	/// Loads and validates a configuration document from `path`
	fn load_from_path(path: &Path) -> Result<Self, ConfigError>;

	/// Checks the loaded values, returning a human-readable reason on failure
	fn validate(&self) -> Result<(), String>;

	fn is_json_file(path: &Path) -> bool {
		path.extension()
			.map(|ext| ext.to_string_lossy().to_lowercase() == "json")
			.unwrap_or(false)
	}
}
