//! Community fraud report repository and service.
//!
//! One [`FraudReport`] document per reported address. A user can report an
//! address once; later reports by other users add to the same document.
//!
//! - `FileFraudReportRepository`: one JSON document per address under
//!   `<data_dir>/reports/`
//! - `MemoryFraudReportRepository`: in-process map, used for tests and
//!   embedding

use std::{
	collections::HashMap,
	path::{Path, PathBuf},
	sync::Arc,
};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::{
	models::{Address, Chain, FraudReport, ReportCategory},
	repositories::{
		error::RepositoryError,
		storage::{read_document, storage_key, write_document},
	},
};

/// Message surfaced when a user reports the same address twice
pub const DUPLICATE_REPORT_MESSAGE: &str = "You have already reported this wallet address";

/// Number of reports returned by [`FraudReportService::list_reports`] by default
pub const DEFAULT_REPORT_LIST_LIMIT: usize = 100;

/// A mutation applied to a report inside [`FraudReportRepositoryTrait::update`].
///
/// Returning an error aborts the update and leaves the stored report untouched.
pub type ReportMutation =
	Box<dyn FnOnce(&mut FraudReport) -> Result<(), RepositoryError> + Send + 'static>;

/// Interface for fraud report repository implementations
#[async_trait]
pub trait FraudReportRepositoryTrait: Send + Sync {
	/// Load the report for an address, `None` when nobody reported it
	async fn load(&self, address: &Address) -> Result<Option<FraudReport>, RepositoryError>;

	/// Every stored report, in no particular order
	async fn list(&self) -> Result<Vec<FraudReport>, RepositoryError>;

	/// Load (or create) the report for an address, apply the mutation and save
	/// it. Returns the report as stored.
	async fn update(
		&self,
		address: &Address,
		mutation: ReportMutation,
	) -> Result<FraudReport, RepositoryError>;
}

/// File-backed fraud report storage
pub struct FileFraudReportRepository {
	storage_path: PathBuf,
	write_lock: Mutex<()>,
}

impl FileFraudReportRepository {
	/// Create a repository storing documents under `<data_dir>/reports`
	pub fn new(data_dir: impl AsRef<Path>) -> Self {
		Self {
			storage_path: data_dir.as_ref().join("reports"),
			write_lock: Mutex::new(()),
		}
	}

	fn report_path(&self, address: &Address) -> PathBuf {
		self.storage_path.join(format!(
			"{}-{}.json",
			address.chain(),
			storage_key(address.as_str())
		))
	}

	async fn read_report(&self, address: &Address) -> Result<Option<FraudReport>, RepositoryError> {
		let path = self.report_path(address);
		let report: Option<FraudReport> = read_document(&path).await?;
		if let Some(report) = &report {
			if !report.is_for(address) {
				return Err(RepositoryError::load_error(format!(
					"{} holds the report of another address",
					path.display()
				)));
			}
		}
		Ok(report)
	}
}

#[async_trait]
impl FraudReportRepositoryTrait for FileFraudReportRepository {
	async fn load(&self, address: &Address) -> Result<Option<FraudReport>, RepositoryError> {
		self.read_report(address).await
	}

	async fn list(&self) -> Result<Vec<FraudReport>, RepositoryError> {
		let mut entries = match tokio::fs::read_dir(&self.storage_path).await {
			Ok(entries) => entries,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
			Err(e) => return Err(e.into()),
		};

		let mut reports = Vec::new();
		while let Some(entry) = entries.next_entry().await? {
			let path = entry.path();
			if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
				continue;
			}
			match read_document::<FraudReport>(&path).await {
				Ok(Some(report)) => reports.push(report),
				Ok(None) => {}
				Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable report"),
			}
		}
		Ok(reports)
	}

	async fn update(
		&self,
		address: &Address,
		mutation: ReportMutation,
	) -> Result<FraudReport, RepositoryError> {
		let _guard = self.write_lock.lock().await;
		let mut report = self
			.read_report(address)
			.await?
			.unwrap_or_else(|| FraudReport::new(address));
		mutation(&mut report)?;
		write_document(&self.report_path(address), &report).await?;
		Ok(report)
	}
}

/// In-memory fraud report storage
#[derive(Default)]
pub struct MemoryFraudReportRepository {
	reports: Mutex<HashMap<(Chain, String), FraudReport>>,
}

impl MemoryFraudReportRepository {
	pub fn new() -> Self {
		Self::default()
	}
}

fn memory_key(address: &Address) -> (Chain, String) {
	(address.chain(), address.as_str().to_string())
}

#[async_trait]
impl FraudReportRepositoryTrait for MemoryFraudReportRepository {
	async fn load(&self, address: &Address) -> Result<Option<FraudReport>, RepositoryError> {
		Ok(self.reports.lock().await.get(&memory_key(address)).cloned())
	}

	async fn list(&self) -> Result<Vec<FraudReport>, RepositoryError> {
		Ok(self.reports.lock().await.values().cloned().collect())
	}

	async fn update(
		&self,
		address: &Address,
		mutation: ReportMutation,
	) -> Result<FraudReport, RepositoryError> {
		let mut reports = self.reports.lock().await;
		let key = memory_key(address);
		let mut report = reports
			.get(&key)
			.cloned()
			.unwrap_or_else(|| FraudReport::new(address));
		mutation(&mut report)?;
		reports.insert(key, report.clone());
		Ok(report)
	}
}

/// Community fraud reporting over a report repository
pub struct FraudReportService<R: FraudReportRepositoryTrait> {
	repository: Arc<R>,
}

impl<R: FraudReportRepositoryTrait> Clone for FraudReportService<R> {
	fn clone(&self) -> Self {
		Self {
			repository: Arc::clone(&self.repository),
		}
	}
}

impl<R: FraudReportRepositoryTrait> FraudReportService<R> {
	pub fn new(repository: R) -> Self {
		Self::new_with_repository(Arc::new(repository))
	}

	pub fn new_with_repository(repository: Arc<R>) -> Self {
		Self { repository }
	}

	/// Report an address on behalf of `reporter`.
	///
	/// Fails with `DuplicateEntry` when this reporter already reported the
	/// address. Returns the report with every reporter so far.
	pub async fn submit_report(
		&self,
		reporter: &str,
		address: &Address,
		category: ReportCategory,
		note: Option<String>,
	) -> Result<FraudReport, RepositoryError> {
		let reporter = reporter.trim().to_string();
		if reporter.is_empty() {
			return Err(RepositoryError::validation_error("Reporter is required"));
		}

		let submitted_by = reporter.clone();
		let report = self
			.repository
			.update(
				address,
				Box::new(move |report| {
					if report.has_reporter(&submitted_by) {
						return Err(RepositoryError::duplicate_entry(DUPLICATE_REPORT_MESSAGE));
					}
					report.add_report(&submitted_by, category, note.as_deref());
					Ok(())
				}),
			)
			.await?;

		info!(
			reporter = %reporter,
			address = %address,
			category = %category,
			frequency = report.frequency,
			"fraud report submitted"
		);
		Ok(report)
	}

	/// The report for an address, `None` when nobody reported it
	pub async fn check_report(
		&self,
		address: &Address,
	) -> Result<Option<FraudReport>, RepositoryError> {
		self.repository.load(address).await
	}

	/// Up to `limit` reports, most reported first
	pub async fn list_reports(&self, limit: usize) -> Result<Vec<FraudReport>, RepositoryError> {
		let mut reports = self.repository.list().await?;
		reports.sort_by(|a, b| {
			b.frequency
				.cmp(&a.frequency)
				.then_with(|| b.updated_at.cmp(&a.updated_at))
		});
		reports.truncate(limit);
		Ok(reports)
	}
}
