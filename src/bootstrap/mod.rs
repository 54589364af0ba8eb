//! Bootstrap module for initializing services from configuration.
//!
//! Builds the storage-backed services and the risk aggregator with its three
//! sources:
//!
//! # Services
//! - `BlocklistService` / `TrustedContactService`: per-user records on disk
//! - `FraudReportService`: community fraud reports on disk
//! - `AbuseRegistryClient`: the external abuse registry
//! - `ChainActivityAnalyzer`: one ledger client per configured chain
//! - `RiskAggregator`: combines the three into a verdict
//! - `FileReceiptStore`: audit trail of completed transfers

use std::{collections::HashMap, error::Error, sync::Arc};

use tracing::info;

use crate::{
	models::{Chain, ChainConfig, GuardConfig},
	repositories::{
		BlocklistService, FileFraudReportRepository, FileReceiptStore, FileUserRepository,
		FraudReportService, TrustedContactService, UserRepositoryTrait,
	},
	services::{
		activity::ChainActivityAnalyzer,
		blockchain::{EvmClient, LedgerClient, SolanaClient},
		registry::AbuseRegistryClient,
		risk::RiskAggregator,
	},
	utils::http::HttpRetryConfig,
};

/// Type alias for handling ServiceResult
pub type Result<T> = std::result::Result<T, Box<dyn Error + Send + Sync>>;

/// The aggregator as wired from configuration
pub type GuardAggregator<R> =
	RiskAggregator<BlocklistService<R>, AbuseRegistryClient, ChainActivityAnalyzer>;

/// Everything a front end needs to screen recipients and record transfers
pub struct GuardServices<R: UserRepositoryTrait> {
	pub blocklist: BlocklistService<R>,
	pub contacts: TrustedContactService<R>,
	pub aggregator: Arc<GuardAggregator<R>>,
	pub reports: FraudReportService<FileFraudReportRepository>,
	pub receipts: Arc<FileReceiptStore>,
}

/// Registry code per configured chain
pub fn registry_chain_codes(config: &GuardConfig) -> HashMap<Chain, String> {
	config
		.chains
		.iter()
		.map(|chain| (chain.chain, chain.registry_code()))
		.collect()
}

/// Creates the ledger client for one chain section
pub fn create_ledger_client(chain: &ChainConfig) -> Result<Arc<dyn LedgerClient>> {
	let retry_config = HttpRetryConfig::with_max_retries(chain.max_retries);
	let client: Arc<dyn LedgerClient> = match chain.chain {
		Chain::Solana => Arc::new(SolanaClient::new(
			&chain.rpc_urls,
			chain.rpc_timeout(),
			&retry_config,
		)?),
		Chain::Ethereum => Arc::new(EvmClient::new(
			&chain.rpc_urls,
			chain.rpc_timeout(),
			&retry_config,
		)?),
	};
	Ok(client)
}

/// Creates the activity analyzer with a client for every configured chain
pub fn create_activity_analyzer(config: &GuardConfig) -> Result<ChainActivityAnalyzer> {
	let mut analyzer = ChainActivityAnalyzer::new(&config.activity);
	for chain in &config.chains {
		analyzer = analyzer.with_client(create_ledger_client(chain)?);
	}
	Ok(analyzer)
}

/// Initializes all services with file storage under `storage.data_dir`.
///
/// # Errors
/// Returns an error if a client cannot be built from the configuration
pub fn initialize_services(config: &GuardConfig) -> Result<GuardServices<FileUserRepository>> {
	let repository = Arc::new(FileUserRepository::new(&config.storage.data_dir));
	initialize_services_with_repository(config, repository)
}

/// Initializes all services on top of an existing user repository
pub fn initialize_services_with_repository<R: UserRepositoryTrait>(
	config: &GuardConfig,
	repository: Arc<R>,
) -> Result<GuardServices<R>> {
	let blocklist = BlocklistService::new_with_repository(Arc::clone(&repository));
	let contacts = TrustedContactService::new_with_repository(repository);

	let registry = AbuseRegistryClient::new(&config.registry, registry_chain_codes(config))?;
	let analyzer = create_activity_analyzer(config)?;
	let aggregator = RiskAggregator::new(
		blocklist.clone(),
		registry,
		analyzer,
		config.assessment.source_timeout(),
	);

	info!(
		chains = config.chains.len(),
		data_dir = %config.storage.data_dir.display(),
		"services initialized"
	);

	Ok(GuardServices {
		blocklist,
		contacts,
		aggregator: Arc::new(aggregator),
		reports: FraudReportService::new(FileFraudReportRepository::new(
			&config.storage.data_dir,
		)),
		receipts: Arc::new(FileReceiptStore::new(&config.storage.data_dir)),
	})
}
