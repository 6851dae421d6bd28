//! Thread-safe in-memory [`CredentialStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	store::{CredentialStore, StoreFuture},
};

#[derive(Debug, Default)]
struct Slots {
	access: Option<TokenSecret>,
	refresh: Option<TokenSecret>,
}

type SharedSlots = Arc<RwLock<Slots>>;

/// Thread-safe storage backend that keeps the token pair in-process for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(SharedSlots);
impl MemoryStore {
	/// Synchronously returns the stored access token; handy for test assertions.
	pub fn access_token_now(&self) -> Option<TokenSecret> {
		self.0.read().access.clone()
	}

	/// Synchronously returns the stored refresh token; handy for test assertions.
	pub fn refresh_token_now(&self) -> Option<TokenSecret> {
		self.0.read().refresh.clone()
	}

	/// Synchronously seeds both tokens, replacing whatever was stored.
	pub fn seed(&self, access: impl Into<String>, refresh: impl Into<String>) {
		let mut slots = self.0.write();

		slots.access = Some(TokenSecret::new(access));
		slots.refresh = Some(TokenSecret::new(refresh));
	}
}
impl CredentialStore for MemoryStore {
	fn access_token(&self) -> StoreFuture<'_, Option<TokenSecret>> {
		let slots = self.0.clone();

		Box::pin(async move { Ok(slots.read().access.clone()) })
	}

	fn refresh_token(&self) -> StoreFuture<'_, Option<TokenSecret>> {
		let slots = self.0.clone();

		Box::pin(async move { Ok(slots.read().refresh.clone()) })
	}

	fn set_access_token<'a>(&'a self, token: &'a TokenSecret) -> StoreFuture<'a, ()> {
		let slots = self.0.clone();
		let token = token.clone();

		Box::pin(async move {
			slots.write().access = Some(token);

			Ok(())
		})
	}

	fn set_refresh_token<'a>(&'a self, token: &'a TokenSecret) -> StoreFuture<'a, ()> {
		let slots = self.0.clone();
		let token = token.clone();

		Box::pin(async move {
			slots.write().refresh = Some(token);

			Ok(())
		})
	}

	fn clear_access_token(&self) -> StoreFuture<'_, ()> {
		let slots = self.0.clone();

		Box::pin(async move {
			slots.write().access = None;

			Ok(())
		})
	}

	fn clear_refresh_token(&self) -> StoreFuture<'_, ()> {
		let slots = self.0.clone();

		Box::pin(async move {
			slots.write().refresh = None;

			Ok(())
		})
	}
}
