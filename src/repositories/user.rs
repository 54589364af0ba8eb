//! User record repository implementation.
//!
//! This module provides storage for per-user documents holding the blocklist
//! and trusted contacts. Two backends are available:
//!
//! - `FileUserRepository`: one JSON document per user under `<data_dir>/users/`
//! - `MemoryUserRepository`: in-process map, used for tests and embedding
//!
//! Mutations go through [`UserRepositoryTrait::update`], which serializes the
//! load/mutate/save sequence so two concurrent changes to the same user cannot
//! drop each other.

use std::{
	collections::HashMap,
	path::{Path, PathBuf},
};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
	models::UserRecord,
	repositories::{
		error::RepositoryError,
		storage::{read_document, storage_key, write_document},
	},
};

/// Whether a mutation changed the record it was given
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordChange {
	Modified,
	Unchanged,
}

impl From<bool> for RecordChange {
	fn from(modified: bool) -> Self {
		if modified {
			Self::Modified
		} else {
			Self::Unchanged
		}
	}
}

/// A mutation applied to a user record inside [`UserRepositoryTrait::update`].
///
/// Returning an error aborts the update and leaves the stored record untouched.
/// Returning [`RecordChange::Unchanged`] skips the write entirely.
pub type RecordMutation =
	Box<dyn FnOnce(&mut UserRecord) -> Result<RecordChange, RepositoryError> + Send + 'static>;

/// Interface for user record repository implementations
#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
	/// Load the record for a user, `None` when the user has never been stored
	async fn load(&self, user_id: &str) -> Result<Option<UserRecord>, RepositoryError>;

	/// Persist a full record, replacing any previous version
	async fn save(&self, record: &UserRecord) -> Result<(), RepositoryError>;

	/// Load (or create) a record, apply the mutation, stamp `last_updated` and
	/// save it. Returns the record as stored.
	///
	/// When the mutation reports no change nothing is written, a missing
	/// record stays missing and the returned record is not persisted.
	async fn update(
		&self,
		user_id: &str,
		mutation: RecordMutation,
	) -> Result<UserRecord, RepositoryError>;
}

/// File-backed user record storage
pub struct FileUserRepository {
	storage_path: PathBuf,
	write_lock: Mutex<()>,
}

impl FileUserRepository {
	/// Create a repository storing documents under `<data_dir>/users`
	pub fn new(data_dir: impl AsRef<Path>) -> Self {
		Self {
			storage_path: data_dir.as_ref().join("users"),
			write_lock: Mutex::new(()),
		}
	}

	fn record_path(&self, user_id: &str) -> PathBuf {
		self.storage_path.join(format!("{}.json", storage_key(user_id)))
	}

	async fn read_record(&self, user_id: &str) -> Result<Option<UserRecord>, RepositoryError> {
		let path = self.record_path(user_id);
		let record: Option<UserRecord> = read_document(&path).await?;
		if let Some(record) = &record {
			if record.user_id != user_id {
				return Err(RepositoryError::load_error(format!(
					"{} holds the record of another user",
					path.display()
				)));
			}
		}
		Ok(record)
	}

	async fn write_record(&self, record: &UserRecord) -> Result<(), RepositoryError> {
		write_document(&self.record_path(&record.user_id), record).await
	}
}

#[async_trait]
impl UserRepositoryTrait for FileUserRepository {
	async fn load(&self, user_id: &str) -> Result<Option<UserRecord>, RepositoryError> {
		self.read_record(user_id).await
	}

	async fn save(&self, record: &UserRecord) -> Result<(), RepositoryError> {
		let _guard = self.write_lock.lock().await;
		self.write_record(record).await
	}

	async fn update(
		&self,
		user_id: &str,
		mutation: RecordMutation,
	) -> Result<UserRecord, RepositoryError> {
		let _guard = self.write_lock.lock().await;
		let mut record = self
			.read_record(user_id)
			.await?
			.unwrap_or_else(|| UserRecord::new(user_id));
		if mutation(&mut record)? == RecordChange::Unchanged {
			return Ok(record);
		}
		record.touch();
		self.write_record(&record).await?;
		Ok(record)
	}
}

/// In-memory user record storage
#[derive(Default)]
pub struct MemoryUserRepository {
	records: Mutex<HashMap<String, UserRecord>>,
}

impl MemoryUserRepository {
	pub fn new() -> Self {
		Self::default()
	}

	/// Create a repository pre-populated with the given records
	pub fn with_records(records: impl IntoIterator<Item = UserRecord>) -> Self {
		let records = records
			.into_iter()
			.map(|record| (record.user_id.clone(), record))
			.collect();
		Self {
			records: Mutex::new(records),
		}
	}
}

#[async_trait]
impl UserRepositoryTrait for MemoryUserRepository {
	async fn load(&self, user_id: &str) -> Result<Option<UserRecord>, RepositoryError> {
		Ok(self.records.lock().await.get(user_id).cloned())
	}

	async fn save(&self, record: &UserRecord) -> Result<(), RepositoryError> {
		self.records
			.lock()
			.await
			.insert(record.user_id.clone(), record.clone());
		Ok(())
	}

	async fn update(
		&self,
		user_id: &str,
		mutation: RecordMutation,
	) -> Result<UserRecord, RepositoryError> {
		let mut records = self.records.lock().await;
		let mut record = records
			.get(user_id)
			.cloned()
			.unwrap_or_else(|| UserRecord::new(user_id));
		if mutation(&mut record)? == RecordChange::Unchanged {
			return Ok(record);
		}
		record.touch();
		records.insert(user_id.to_string(), record.clone());
		Ok(record)
	}
}
