//! JSON document storage helpers shared by the file-backed repositories.

use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::repositories::error::RepositoryError;

/// Maps an identifier onto a file stem.
///
/// Lowercase ASCII letters, digits and `-` are kept; every other byte is
/// written as `_` plus two lowercase hex digits. The mapping is injective and
/// case-folding filesystems cannot merge two stems, so every id owns its own
/// file. The result never contains a path separator or starts with a dot.
pub fn storage_key(id: &str) -> String {
	if id.is_empty() {
		return "_".to_string();
	}

	let mut key = String::with_capacity(id.len());
	for byte in id.bytes() {
		match byte {
			b'a'..=b'z' | b'0'..=b'9' | b'-' => key.push(char::from(byte)),
			_ => {
				key.push('_');
				key.push_str(&hex::encode([byte]));
			}
		}
	}
	key
}

/// Reads and parses a document, `None` when the file does not exist
pub(crate) async fn read_document<T: DeserializeOwned>(
	path: &Path,
) -> Result<Option<T>, RepositoryError> {
	let content = match tokio::fs::read_to_string(path).await {
		Ok(content) => content,
		Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
		Err(e) => {
			return Err(RepositoryError::load_error(format!(
				"Failed to read {}: {}",
				path.display(),
				e
			)))
		}
	};

	serde_json::from_str(&content).map(Some).map_err(|e| {
		RepositoryError::load_error(format!("Malformed document {}: {}", path.display(), e))
	})
}

/// Writes a document beside its target and renames it into place, so readers
/// never see a torn file
pub(crate) async fn write_document<T: Serialize>(
	path: &Path,
	document: &T,
) -> Result<(), RepositoryError> {
	if let Some(dir) = path.parent() {
		tokio::fs::create_dir_all(dir).await.map_err(|e| {
			RepositoryError::save_error(format!("Failed to create {}: {}", dir.display(), e))
		})?;
	}

	let json = serde_json::to_string_pretty(document).map_err(|e| {
		RepositoryError::internal_error(format!("Failed to serialize {}: {}", path.display(), e))
	})?;

	let tmp_path = path.with_extension("json.tmp");
	tokio::fs::write(&tmp_path, json).await.map_err(|e| {
		RepositoryError::save_error(format!("Failed to write {}: {}", tmp_path.display(), e))
	})?;
	tokio::fs::rename(&tmp_path, path).await.map_err(|e| {
		RepositoryError::save_error(format!("Failed to replace {}: {}", path.display(), e))
	})?;
	Ok(())
}
