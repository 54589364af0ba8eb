use serde::{Deserialize, Serialize};
use std::{
	collections::HashSet,
	fmt,
	path::{Path, PathBuf},
	time::Duration,
};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::models::{Chain, ConfigLoader};

use super::error::ConfigError;

/// Where the CLI looks for its configuration when no path is given
pub const DEFAULT_CONFIG_PATH: &str = "config/guard.json";

/// Environment variable overriding the registry credential
pub const REGISTRY_API_KEY_ENV: &str = "REGISTRY_API_KEY";

/// A credential that is wiped from memory on drop and never printed
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct SecretValue(String);

impl SecretValue {
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	pub fn expose(&self) -> &str {
		&self.0
	}
}

impl fmt::Debug for SecretValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "SecretValue(REDACTED)")
	}
}

/// How requests to the abuse registry are authenticated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RegistryCredential {
	Basic {
		username: String,
		password: SecretValue,
	},
	Bearer {
		token: SecretValue,
	},
}

impl RegistryCredential {
	/// Credential form for registries that take an API key as both basic-auth
	/// username and password
	pub fn api_key(key: &str) -> Self {
		RegistryCredential::Basic {
			username: key.to_string(),
			password: SecretValue::new(key),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
	/// Base URL of the registry API, e.g. `https://api.chainabuse.com/v0`
	pub endpoint: String,
	#[serde(default)]
	pub credential: Option<RegistryCredential>,
	#[serde(default = "default_registry_timeout_ms")]
	pub timeout_ms: u64,
	#[serde(default = "default_per_page")]
	pub per_page: u32,
	#[serde(default)]
	pub max_retries: u32,
}

impl RegistryConfig {
	pub fn timeout(&self) -> Duration {
		Duration::from_millis(self.timeout_ms)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
	pub chain: Chain,
	/// Code the registry uses for this chain; defaults to the ticker
	#[serde(default)]
	pub registry_code: Option<String>,
	/// Ledger RPC endpoints in order of preference
	pub rpc_urls: Vec<String>,
	#[serde(default = "default_rpc_timeout_ms")]
	pub rpc_timeout_ms: u64,
	#[serde(default)]
	pub max_retries: u32,
}

impl ChainConfig {
	pub fn rpc_timeout(&self) -> Duration {
		Duration::from_millis(self.rpc_timeout_ms)
	}

	pub fn registry_code(&self) -> String {
		self.registry_code
			.clone()
			.unwrap_or_else(|| self.chain.default_registry_code().to_string())
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityConfig {
	/// How many recent signatures to request from the ledger
	#[serde(default = "default_signature_limit")]
	pub signature_limit: usize,
	/// How many transaction references to keep in a result
	#[serde(default = "default_max_recent_refs")]
	pub max_recent_refs: usize,
}

impl Default for ActivityConfig {
	fn default() -> Self {
		Self {
			signature_limit: default_signature_limit(),
			max_recent_refs: default_max_recent_refs(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentConfig {
	/// Upper bound on each concurrent source before it counts as unavailable
	#[serde(default = "default_source_timeout_ms")]
	pub source_timeout_ms: u64,
}

impl AssessmentConfig {
	pub fn source_timeout(&self) -> Duration {
		Duration::from_millis(self.source_timeout_ms)
	}
}

impl Default for AssessmentConfig {
	fn default() -> Self {
		Self {
			source_timeout_ms: default_source_timeout_ms(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
	#[serde(default = "default_data_dir")]
	pub data_dir: PathBuf,
}

impl Default for StorageConfig {
	fn default() -> Self {
		Self {
			data_dir: default_data_dir(),
		}
	}
}

/// Top-level guard configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardConfig {
	pub registry: RegistryConfig,
	pub chains: Vec<ChainConfig>,
	#[serde(default)]
	pub activity: ActivityConfig,
	#[serde(default)]
	pub assessment: AssessmentConfig,
	#[serde(default)]
	pub storage: StorageConfig,
}

fn default_registry_timeout_ms() -> u64 {
	8_000
}

fn default_per_page() -> u32 {
	50
}

fn default_rpc_timeout_ms() -> u64 {
	10_000
}

fn default_signature_limit() -> usize {
	100
}

fn default_max_recent_refs() -> usize {
	5
}

fn default_source_timeout_ms() -> u64 {
	10_000
}

fn default_data_dir() -> PathBuf {
	PathBuf::from("data")
}

const MIN_TIMEOUT_MS: u64 = 1;
const MAX_TIMEOUT_MS: u64 = 60_000;

fn is_http_url(url: &str) -> bool {
	url.starts_with("http://") || url.starts_with("https://")
}

impl GuardConfig {
	pub fn chain(&self, chain: Chain) -> Option<&ChainConfig> {
		self.chains.iter().find(|c| c.chain == chain)
	}

	/// Registry code for `chain`, falling back to the built-in alias
	pub fn registry_code(&self, chain: Chain) -> String {
		self.chain(chain)
			.map(|c| c.registry_code())
			.unwrap_or_else(|| chain.default_registry_code().to_string())
	}

	/// Replaces the registry credential with the one from the environment, if set
	pub fn apply_env_overrides(&mut self) {
		if let Ok(key) = std::env::var(REGISTRY_API_KEY_ENV) {
			if !key.trim().is_empty() {
				self.registry.credential = Some(RegistryCredential::api_key(key.trim()));
			}
		}
	}
}

impl ConfigLoader for GuardConfig {
	fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
		if !Self::is_json_file(path) {
			return Err(ConfigError::file_error(format!(
				"{} is not a JSON file",
				path.display()
			)));
		}

		let file = std::fs::File::open(path)?;
		let mut config: GuardConfig = serde_json::from_reader(file)?;
		config.apply_env_overrides();

		// Validate the config after loading
		if let Err(validation_error) = config.validate() {
			return Err(ConfigError::validation_error(validation_error));
		}

		Ok(config)
	}

	fn validate(&self) -> Result<(), String> {
		// Validate registry endpoint
		if !is_http_url(&self.registry.endpoint) {
			return Err("Registry endpoint must start with http:// or https://".to_string());
		}

		if !(MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&self.registry.timeout_ms) {
			return Err(format!(
				"Registry timeout must be between {} and {} ms",
				MIN_TIMEOUT_MS, MAX_TIMEOUT_MS
			));
		}

		if self.registry.per_page == 0 {
			return Err("Registry per_page must be greater than 0".to_string());
		}

		// Validate chains
		if self.chains.is_empty() {
			return Err("At least one chain must be configured".to_string());
		}

		let mut seen = HashSet::new();
		for chain in &self.chains {
			if !seen.insert(chain.chain) {
				return Err(format!("Chain {} is configured more than once", chain.chain));
			}

			if chain.rpc_urls.is_empty() {
				return Err(format!("Chain {} has no RPC URLs", chain.chain));
			}

			if !chain.rpc_urls.iter().all(|url| is_http_url(url)) {
				return Err(format!(
					"All RPC URLs of chain {} must start with http:// or https://",
					chain.chain
				));
			}

			if !(MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&chain.rpc_timeout_ms) {
				return Err(format!(
					"RPC timeout of chain {} must be between {} and {} ms",
					chain.chain, MIN_TIMEOUT_MS, MAX_TIMEOUT_MS
				));
			}

			if let Some(code) = &chain.registry_code {
				if code.trim().is_empty() {
					return Err(format!("Registry code of chain {} is empty", chain.chain));
				}
			}
		}

		// Validate activity limits
		if self.activity.signature_limit == 0 || self.activity.signature_limit > 1000 {
			return Err("Activity signature_limit must be between 1 and 1000".to_string());
		}

		if !(MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&self.assessment.source_timeout_ms) {
			return Err(format!(
				"Assessment source timeout must be between {} and {} ms",
				MIN_TIMEOUT_MS, MAX_TIMEOUT_MS
			));
		}

		Ok(())
	}
}
