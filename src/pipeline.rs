//! High-level request pipeline powered by the gate facade.

pub mod install;
pub mod refresh;

mod dispatch;
mod intercept;

pub use install::*;
pub use refresh::*;

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	backend::BackendDescriptor,
	http::Transport,
	obs,
	session::SessionSink,
	store::CredentialStore,
};
#[cfg(feature = "reqwest")]
use crate::http::ReqwestTransport;
use refresh::RefreshEpisode;

#[cfg(feature = "reqwest")]
/// Gate specialized for the crate's default reqwest transport stack.
pub type ReqwestGate = Gate<ReqwestTransport>;

/// Coordinates authenticated backend calls behind a single descriptor.
///
/// The gate owns the transport, credential store, backend descriptor, and
/// session sink so the dispatch/intercept/refresh stages can focus on their
/// own logic (bearer attachment, expiry classification, single-flight
/// rotation). Clones share the refresh slot and fallback bearer, so every
/// handle to the same gate funnels into the same refresh episode.
pub struct Gate<C>
where
	C: ?Sized + Transport,
{
	/// Transport used for every outbound backend request.
	pub transport: Arc<C>,
	/// Credential store that persists the bearer pair.
	pub store: Arc<dyn CredentialStore>,
	/// Backend descriptor that defines the base URL, refresh endpoint, and exclusions.
	pub descriptor: BackendDescriptor,
	/// Sink notified about token rotations and forced logouts.
	pub session: Arc<dyn SessionSink>,
	/// Shared metrics recorder for refresh episode outcomes.
	pub refresh_metrics: Arc<RefreshMetrics>,
	default_bearer: Arc<RwLock<Option<TokenSecret>>>,
	refresh_slot: Arc<Mutex<Option<Arc<RefreshEpisode>>>>,
}
impl<C> Gate<C>
where
	C: ?Sized + Transport,
{
	/// Creates a gate that reuses the caller-provided transport.
	pub fn with_transport(
		store: Arc<dyn CredentialStore>,
		descriptor: BackendDescriptor,
		session: Arc<dyn SessionSink>,
		transport: impl Into<Arc<C>>,
	) -> Self {
		Self {
			transport: transport.into(),
			store,
			descriptor,
			session,
			refresh_metrics: Default::default(),
			default_bearer: Default::default(),
			refresh_slot: Default::default(),
		}
	}

	/// Seeds the fallback bearer attached when the store yields no access token.
	pub fn with_default_bearer(self, token: TokenSecret) -> Self {
		*self.default_bearer.write() = Some(token);

		self
	}

	/// Clears the stored credential pair and the fallback bearer.
	///
	/// This is the caller-initiated teardown path; session sinks are not
	/// notified, unlike the forced logout raised by a failed refresh.
	pub async fn logout(&self) {
		self.clear_credentials().await;
	}

	pub(crate) async fn read_access_token(&self) -> Option<TokenSecret> {
		match self.store.access_token().await {
			Ok(token) => token,
			Err(err) => {
				obs::warn_store_degraded("access_token", &err);

				None
			},
		}
	}

	pub(crate) async fn read_refresh_token(&self) -> Option<TokenSecret> {
		match self.store.refresh_token().await {
			Ok(token) => token,
			Err(err) => {
				obs::warn_store_degraded("refresh_token", &err);

				None
			},
		}
	}

	pub(crate) async fn clear_credentials(&self) {
		if let Err(err) = self.store.clear_access_token().await {
			obs::warn_store_degraded("clear_access_token", &err);
		}
		if let Err(err) = self.store.clear_refresh_token().await {
			obs::warn_store_degraded("clear_refresh_token", &err);
		}

		*self.default_bearer.write() = None;
	}
}
#[cfg(feature = "reqwest")]
impl Gate<ReqwestTransport> {
	/// Creates a new gate for the provided descriptor.
	///
	/// The gate provisions its own reqwest-backed transport so callers do not
	/// need to pass HTTP handles explicitly. Use [`Gate::with_default_bearer`]
	/// to seed a credential for sessions restored outside the store.
	pub fn new(
		store: Arc<dyn CredentialStore>,
		descriptor: BackendDescriptor,
		session: Arc<dyn SessionSink>,
	) -> Self {
		Self::with_transport(store, descriptor, session, ReqwestTransport::default())
	}
}
impl<C> Clone for Gate<C>
where
	C: ?Sized + Transport,
{
	// Derived `Clone` would demand `C: Clone`; handles only share `Arc`s.
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			store: self.store.clone(),
			descriptor: self.descriptor.clone(),
			session: self.session.clone(),
			refresh_metrics: self.refresh_metrics.clone(),
			default_bearer: self.default_bearer.clone(),
			refresh_slot: self.refresh_slot.clone(),
		}
	}
}
impl<C> Debug for Gate<C>
where
	C: ?Sized + Transport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Gate")
			.field("descriptor", &self.descriptor)
			.field("default_bearer_set", &self.default_bearer.read().is_some())
			.finish()
	}
}
