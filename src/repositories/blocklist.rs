//! Blocklist service.
//!
//! The blocklist is the user's authoritative veto: an address present here is
//! never sent funds, whatever the other signals say. Entries live on the
//! user's record and every mutation stamps the record's `last_updated`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, warn};

use crate::{
	models::{AddedBy, Address, BlocklistEntry},
	repositories::{
		error::RepositoryError,
		user::{RecordChange, UserRepositoryTrait},
	},
};

/// Message surfaced when an address is added twice
pub const DUPLICATE_BLOCKLIST_MESSAGE: &str = "Address is already in blocklist";

/// Read-side seam used by the risk aggregator.
///
/// Unlike [`BlocklistService::is_blocked`], storage failures are returned so
/// the caller can report them instead of treating the address as clean.
#[async_trait]
pub trait BlocklistChecker: Send + Sync {
	async fn lookup(
		&self,
		user_id: &str,
		address: &Address,
	) -> Result<Option<BlocklistEntry>, RepositoryError>;
}

/// Blocklist operations over a user record repository
pub struct BlocklistService<R: UserRepositoryTrait> {
	repository: Arc<R>,
}

impl<R: UserRepositoryTrait> Clone for BlocklistService<R> {
	fn clone(&self) -> Self {
		Self {
			repository: Arc::clone(&self.repository),
		}
	}
}

impl<R: UserRepositoryTrait> BlocklistService<R> {
	pub fn new(repository: R) -> Self {
		Self::new_with_repository(Arc::new(repository))
	}

	/// Create a service sharing a repository with other services
	pub fn new_with_repository(repository: Arc<R>) -> Self {
		Self { repository }
	}

	/// Whether the address is blocked for this user.
	///
	/// Fails open: a storage error is logged and reported as not blocked.
	pub async fn is_blocked(&self, user_id: &str, address: &Address) -> bool {
		match self.get_entry(user_id, address).await {
			Ok(entry) => entry.is_some(),
			Err(e) => {
				warn!(user_id, address = %address, error = %e, "blocklist lookup failed, treating as not blocked");
				false
			}
		}
	}

	pub async fn get_entry(
		&self,
		user_id: &str,
		address: &Address,
	) -> Result<Option<BlocklistEntry>, RepositoryError> {
		let record = self.repository.load(user_id).await?;
		Ok(record.and_then(|record| record.blocklist_entry(address.as_str()).cloned()))
	}

	/// Block an address, failing with `DuplicateEntry` when already present
	pub async fn add_entry(
		&self,
		user_id: &str,
		address: &Address,
		reason: Option<String>,
		added_by: AddedBy,
	) -> Result<BlocklistEntry, RepositoryError> {
		let entry = BlocklistEntry {
			address: address.as_str().to_string(),
			reason: reason.filter(|reason| !reason.trim().is_empty()),
			blocked_at: Utc::now(),
			added_by,
		};

		let inserted = entry.clone();
		self.repository
			.update(
				user_id,
				Box::new(move |record| {
					if record.blocklist_entry(&inserted.address).is_some() {
						return Err(RepositoryError::duplicate_entry(
							DUPLICATE_BLOCKLIST_MESSAGE,
						));
					}
					record.blocklist.push(inserted);
					Ok(RecordChange::Modified)
				}),
			)
			.await?;

		info!(user_id, address = %address, "address added to blocklist");
		Ok(entry)
	}

	/// Unblock an address. Removing an absent entry is a no-op.
	pub async fn remove_entry(
		&self,
		user_id: &str,
		address: &Address,
	) -> Result<(), RepositoryError> {
		let target = address.as_str().to_string();
		self.repository
			.update(
				user_id,
				Box::new(move |record| {
					let before = record.blocklist.len();
					record.blocklist.retain(|entry| entry.address != target);
					Ok(RecordChange::from(record.blocklist.len() != before))
				}),
			)
			.await?;

		info!(user_id, address = %address, "address removed from blocklist");
		Ok(())
	}

	/// All entries for the user, in insertion order
	pub async fn list_entries(&self, user_id: &str) -> Result<Vec<BlocklistEntry>, RepositoryError> {
		Ok(self
			.repository
			.load(user_id)
			.await?
			.map(|record| record.blocklist)
			.unwrap_or_default())
	}
}

#[async_trait]
impl<R: UserRepositoryTrait> BlocklistChecker for BlocklistService<R> {
	async fn lookup(
		&self,
		user_id: &str,
		address: &Address,
	) -> Result<Option<BlocklistEntry>, RepositoryError> {
		self.get_entry(user_id, address).await
	}
}
