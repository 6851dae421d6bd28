//! Simple file-backed [`CredentialStore`] for CLIs, desktop shells, and bots.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	store::{CredentialStore, StoreError, StoreFuture},
};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct Snapshot {
	access_token: Option<TokenSecret>,
	refresh_token: Option<TokenSecret>,
	updated_at: Option<OffsetDateTime>,
}

/// Persists the token pair to a JSON file after each mutation.
///
/// Writes go through a temporary sibling file that is synced and renamed into
/// place, so a crash mid-write never leaves a truncated snapshot behind.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<Snapshot>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = if path.exists() { Self::load_snapshot(&path)? } else { Snapshot::default() };

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	/// Returns the instant of the most recent mutation, if the store was ever written.
	pub fn last_updated_at(&self) -> Option<OffsetDateTime> {
		self.inner.read().updated_at
	}

	fn load_snapshot(path: &Path) -> Result<Snapshot, StoreError> {
		if !path.exists() {
			return Ok(Snapshot::default());
		}

		let metadata = path.metadata().map_err(|e| StoreError::Backend {
			message: format!("Failed to inspect {}: {e}", path.display()),
		})?;

		if metadata.len() == 0 {
			return Ok(Snapshot::default());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
			message: format!("Failed to parse {}: {e}", path.display()),
		})
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}
		Ok(())
	}

	fn persist_locked(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let serialized =
			serde_json::to_vec_pretty(snapshot).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize store snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}

	fn mutate(&self, apply: impl FnOnce(&mut Snapshot)) -> Result<(), StoreError> {
		let mut guard = self.inner.write();

		apply(&mut guard);

		guard.updated_at = Some(OffsetDateTime::now_utc());

		self.persist_locked(&guard)
	}
}
impl CredentialStore for FileStore {
	fn access_token(&self) -> StoreFuture<'_, Option<TokenSecret>> {
		Box::pin(async move { Ok(self.inner.read().access_token.clone()) })
	}

	fn refresh_token(&self) -> StoreFuture<'_, Option<TokenSecret>> {
		Box::pin(async move { Ok(self.inner.read().refresh_token.clone()) })
	}

	fn set_access_token<'a>(&'a self, token: &'a TokenSecret) -> StoreFuture<'a, ()> {
		Box::pin(async move { self.mutate(|snapshot| snapshot.access_token = Some(token.clone())) })
	}

	fn set_refresh_token<'a>(&'a self, token: &'a TokenSecret) -> StoreFuture<'a, ()> {
		Box::pin(async move { self.mutate(|snapshot| snapshot.refresh_token = Some(token.clone())) })
	}

	fn clear_access_token(&self) -> StoreFuture<'_, ()> {
		Box::pin(async move { self.mutate(|snapshot| snapshot.access_token = None) })
	}

	fn clear_refresh_token(&self) -> StoreFuture<'_, ()> {
		Box::pin(async move { self.mutate(|snapshot| snapshot.refresh_token = None) })
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process};
	// crates.io
	use tokio::runtime::Runtime;
	// self
	use super::*;

	fn temp_path() -> PathBuf {
		let unique = format!(
			"refresh_gate_file_store_{}_{}.json",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}

	#[test]
	fn set_and_reload_round_trip() {
		let path = temp_path();
		let store = FileStore::open(&path).expect("Failed to open file store snapshot.");
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");
		let access = TokenSecret::new("access-durable");
		let refresh = TokenSecret::new("refresh-durable");

		rt.block_on(store.set_access_token(&access))
			.expect("Failed to persist access token fixture.");
		rt.block_on(store.set_refresh_token(&refresh))
			.expect("Failed to persist refresh token fixture.");

		assert!(store.last_updated_at().is_some());

		drop(store);

		let reopened = FileStore::open(&path).expect("Failed to reopen file store snapshot.");
		let fetched = rt
			.block_on(reopened.access_token())
			.expect("Failed to read access token from reopened store.")
			.expect("File store lost the access token after reopen.");

		assert_eq!(fetched.expose(), "access-durable");

		let fetched = rt
			.block_on(reopened.refresh_token())
			.expect("Failed to read refresh token from reopened store.")
			.expect("File store lost the refresh token after reopen.");

		assert_eq!(fetched.expose(), "refresh-durable");

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}

	#[test]
	fn clear_empties_one_slot_at_a_time() {
		let path = temp_path();
		let store = FileStore::open(&path).expect("Failed to open file store snapshot.");
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");

		rt.block_on(store.set_access_token(&TokenSecret::new("access")))
			.expect("Failed to persist access token fixture.");
		rt.block_on(store.set_refresh_token(&TokenSecret::new("refresh")))
			.expect("Failed to persist refresh token fixture.");
		rt.block_on(store.clear_access_token()).expect("Failed to clear the access token.");

		let access = rt
			.block_on(store.access_token())
			.expect("Failed to read access token after clearing it.");

		assert!(access.is_none());

		let refresh = rt
			.block_on(store.refresh_token())
			.expect("Failed to read refresh token after clearing the access token.")
			.expect("Refresh token should survive clearing the access token.");

		assert_eq!(refresh.expose(), "refresh");

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}
}
