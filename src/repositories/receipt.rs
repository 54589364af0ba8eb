//! Transfer receipt storage.
//!
//! Receipts are an audit trail written after a successful send. They are
//! append-only: one JSON line per receipt in `<data_dir>/receipts/<key>.jsonl`,
//! where `<key>` is the user's storage key.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::{io::AsyncWriteExt, sync::Mutex};
use tracing::warn;

use crate::{
	models::{Address, Receipt},
	repositories::{error::RepositoryError, storage::storage_key},
};

/// Destination for receipts of successful transfers
#[async_trait]
pub trait ReceiptSink: Send + Sync {
	async fn record(&self, receipt: &Receipt) -> Result<(), RepositoryError>;
}

/// Appends receipts to a per-user JSON lines file
pub struct FileReceiptStore {
	storage_path: PathBuf,
	write_lock: Mutex<()>,
}

impl FileReceiptStore {
	pub fn new(data_dir: impl AsRef<Path>) -> Self {
		Self {
			storage_path: data_dir.as_ref().join("receipts"),
			write_lock: Mutex::new(()),
		}
	}

	fn receipts_path(&self, user_id: &str) -> PathBuf {
		self.storage_path.join(format!("{}.jsonl", storage_key(user_id)))
	}

	/// Every receipt recorded for a user, oldest first.
	///
	/// Lines that do not parse, or that belong to another user, are skipped
	/// with a warning so one damaged line does not hide the rest of the trail.
	pub async fn list(&self, user_id: &str) -> Result<Vec<Receipt>, RepositoryError> {
		let path = self.receipts_path(user_id);
		let content = match tokio::fs::read_to_string(&path).await {
			Ok(content) => content,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
			Err(e) => return Err(e.into()),
		};

		let mut receipts = Vec::new();
		for (index, line) in content.lines().enumerate() {
			if line.trim().is_empty() {
				continue;
			}
			match serde_json::from_str::<Receipt>(line) {
				Ok(receipt) if receipt.user_id == user_id => receipts.push(receipt),
				Ok(receipt) => warn!(
					path = %path.display(),
					line = index + 1,
					owner = %receipt.user_id,
					"skipping receipt of another user"
				),
				Err(e) => warn!(
					path = %path.display(),
					line = index + 1,
					error = %e,
					"skipping malformed receipt line"
				),
			}
		}
		Ok(receipts)
	}

	/// Receipts of transfers sent from one of the user's wallets, oldest first
	pub async fn list_by_wallet(
		&self,
		user_id: &str,
		wallet: &Address,
	) -> Result<Vec<Receipt>, RepositoryError> {
		let mut receipts = self.list(user_id).await?;
		receipts.retain(|receipt| {
			receipt.chain == wallet.chain() && receipt.wallet_address == wallet.as_str()
		});
		Ok(receipts)
	}

	/// The receipt carrying a transaction signature, if the user recorded one
	pub async fn find_by_signature(
		&self,
		user_id: &str,
		signature: &str,
	) -> Result<Option<Receipt>, RepositoryError> {
		let signature = signature.trim();
		Ok(self
			.list(user_id)
			.await?
			.into_iter()
			.find(|receipt| receipt.transaction_signature == signature))
	}
}

#[async_trait]
impl ReceiptSink for FileReceiptStore {
	async fn record(&self, receipt: &Receipt) -> Result<(), RepositoryError> {
		let mut line = serde_json::to_string(receipt).map_err(|e| {
			RepositoryError::internal_error(format!("Failed to serialize receipt: {}", e))
		})?;
		line.push('\n');

		let _guard = self.write_lock.lock().await;
		tokio::fs::create_dir_all(&self.storage_path)
			.await
			.map_err(|e| {
				RepositoryError::save_error(format!(
					"Failed to create {}: {}",
					self.storage_path.display(),
					e
				))
			})?;

		let path = self.receipts_path(&receipt.user_id);
		let mut file = tokio::fs::OpenOptions::new()
			.create(true)
			.append(true)
			.open(&path)
			.await
			.map_err(|e| {
				RepositoryError::save_error(format!("Failed to open {}: {}", path.display(), e))
			})?;
		file.write_all(line.as_bytes()).await.map_err(|e| {
			RepositoryError::save_error(format!("Failed to append to {}: {}", path.display(), e))
		})?;
		file.flush().await.map_err(|e| {
			RepositoryError::save_error(format!("Failed to flush {}: {}", path.display(), e))
		})?;
		Ok(())
	}
}

/// Discards receipts. For embeddings that keep their own audit trail.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReceiptSink;

#[async_trait]
impl ReceiptSink for NoopReceiptSink {
	async fn record(&self, _receipt: &Receipt) -> Result<(), RepositoryError> {
		Ok(())
	}
}
