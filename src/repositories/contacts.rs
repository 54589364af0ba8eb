//! Trusted contacts service.
//!
//! An address book stored beside the blocklist on the user's record. Trusted
//! status is informational only; it is shown alongside a verdict but never
//! changes one.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::{
	models::{Address, TrustedContact},
	repositories::{
		error::RepositoryError,
		user::{RecordChange, UserRepositoryTrait},
	},
};

pub const DUPLICATE_CONTACT_MESSAGE: &str = "Address is already in trusted contacts";

pub struct TrustedContactService<R: UserRepositoryTrait> {
	repository: Arc<R>,
}

impl<R: UserRepositoryTrait> Clone for TrustedContactService<R> {
	fn clone(&self) -> Self {
		Self {
			repository: Arc::clone(&self.repository),
		}
	}
}

fn non_blank(value: Option<String>) -> Option<String> {
	value
		.map(|v| v.trim().to_string())
		.filter(|v| !v.is_empty())
}

impl<R: UserRepositoryTrait> TrustedContactService<R> {
	pub fn new(repository: R) -> Self {
		Self::new_with_repository(Arc::new(repository))
	}

	pub fn new_with_repository(repository: Arc<R>) -> Self {
		Self { repository }
	}

	pub async fn add_contact(
		&self,
		user_id: &str,
		address: &Address,
		name: &str,
		notes: Option<String>,
	) -> Result<TrustedContact, RepositoryError> {
		let name = name.trim();
		if name.is_empty() {
			return Err(RepositoryError::validation_error("Contact name is required"));
		}

		let contact = TrustedContact {
			address: address.as_str().to_string(),
			name: name.to_string(),
			notes: non_blank(notes),
			added_at: Utc::now(),
			updated_at: None,
		};

		let inserted = contact.clone();
		self.repository
			.update(
				user_id,
				Box::new(move |record| {
					if record.contact(&inserted.address).is_some() {
						return Err(RepositoryError::duplicate_entry(DUPLICATE_CONTACT_MESSAGE));
					}
					record.trusted_contacts.push(inserted);
					Ok(RecordChange::Modified)
				}),
			)
			.await?;

		info!(user_id, address = %address, "trusted contact added");
		Ok(contact)
	}

	/// Removing an absent contact is a no-op
	pub async fn remove_contact(
		&self,
		user_id: &str,
		address: &Address,
	) -> Result<(), RepositoryError> {
		let target = address.as_str().to_string();
		self.repository
			.update(
				user_id,
				Box::new(move |record| {
					let before = record.trusted_contacts.len();
					record.trusted_contacts.retain(|c| c.address != target);
					Ok(RecordChange::from(record.trusted_contacts.len() != before))
				}),
			)
			.await?;
		Ok(())
	}

	/// Rename a contact or replace its notes.
	///
	/// Returns `None` and writes nothing when the address is not a contact.
	pub async fn update_contact(
		&self,
		user_id: &str,
		address: &Address,
		name: Option<String>,
		notes: Option<String>,
	) -> Result<Option<TrustedContact>, RepositoryError> {
		let name = non_blank(name);
		let notes = notes.map(|n| n.trim().to_string());
		let target = address.as_str().to_string();

		let lookup = target.clone();
		let record = self
			.repository
			.update(
				user_id,
				Box::new(move |record| {
					if let Some(contact) = record
						.trusted_contacts
						.iter_mut()
						.find(|c| c.address == target)
					{
						if let Some(name) = name {
							contact.name = name;
						}
						if let Some(notes) = notes {
							contact.notes = Some(notes).filter(|n| !n.is_empty());
						}
						contact.updated_at = Some(Utc::now());
						return Ok(RecordChange::Modified);
					}
					Ok(RecordChange::Unchanged)
				}),
			)
			.await?;

		Ok(record.contact(&lookup).cloned())
	}

	pub async fn get_contact(
		&self,
		user_id: &str,
		address: &Address,
	) -> Result<Option<TrustedContact>, RepositoryError> {
		let record = self.repository.load(user_id).await?;
		Ok(record.and_then(|record| record.contact(address.as_str()).cloned()))
	}

	pub async fn is_trusted(
		&self,
		user_id: &str,
		address: &Address,
	) -> Result<bool, RepositoryError> {
		Ok(self.get_contact(user_id, address).await?.is_some())
	}

	pub async fn list_contacts(
		&self,
		user_id: &str,
	) -> Result<Vec<TrustedContact>, RepositoryError> {
		Ok(self
			.repository
			.load(user_id)
			.await?
			.map(|record| record.trusted_contacts)
			.unwrap_or_default())
	}
}
