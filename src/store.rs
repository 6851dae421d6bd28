//! Storage contracts and built-in credential store implementations.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Future type returned by every [`CredentialStore`] operation.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract for the session's token pair.
///
/// Reads resolve with `None` when a slot is simply empty; `Err` strictly means
/// the backend itself is unavailable (quota exceeded, disabled storage, broken
/// disk). The pipeline reads through fail-soft helpers that log an `Err` and
/// continue as if the slot were empty, so implementations must never panic to
/// signal absence.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Returns the stored access token, if any.
	fn access_token(&self) -> StoreFuture<'_, Option<TokenSecret>>;

	/// Returns the stored refresh token, if any.
	fn refresh_token(&self) -> StoreFuture<'_, Option<TokenSecret>>;

	/// Persists or replaces the access token.
	fn set_access_token<'a>(&'a self, token: &'a TokenSecret) -> StoreFuture<'a, ()>;

	/// Persists or replaces the refresh token.
	fn set_refresh_token<'a>(&'a self, token: &'a TokenSecret) -> StoreFuture<'a, ()>;

	/// Removes the stored access token.
	fn clear_access_token(&self) -> StoreFuture<'_, ()>;

	/// Removes the stored refresh token.
	fn clear_refresh_token(&self) -> StoreFuture<'_, ()>;
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as StdError;
	// self
	use super::*;
	use crate::error::Error;

	#[test]
	fn store_error_converts_into_pipeline_error_with_source() {
		let store_error = StoreError::Backend { message: "storage quota exceeded".into() };
		let pipeline_error: Error = store_error.clone().into();

		assert!(matches!(pipeline_error, Error::Storage(_)));
		assert!(pipeline_error.to_string().contains("storage quota exceeded"));

		let source = StdError::source(&pipeline_error)
			.expect("Pipeline error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn store_error_round_trips_through_json() {
		let original = StoreError::Serialization { message: "bad snapshot".into() };
		let payload = serde_json::to_string(&original)
			.expect("Store error fixture should serialize to JSON.");
		let round_trip: StoreError = serde_json::from_str(&payload)
			.expect("Serialized store error should deserialize from JSON.");

		assert_eq!(round_trip, original);
	}
}
