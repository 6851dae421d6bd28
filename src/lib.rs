//! Rust’s turnkey bearer-session gate—attach credentials on dispatch, coalesce expiries into
//! single-flight refreshes, and replay interrupted calls in one crate built for production.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod backend;
pub mod error;
pub mod http;
pub mod obs;
pub mod pipeline;
pub mod request;
pub mod session;
pub mod store;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// std
	use std::sync::atomic::{AtomicU64, Ordering};
	// self
	use crate::{
		auth::TokenSecret,
		backend::BackendDescriptor,
		http::ReqwestTransport,
		pipeline::Gate,
		session::SessionSink,
		store::{CredentialStore, MemoryStore},
	};

	/// Gate type alias used by reqwest-backed integration tests.
	pub type ReqwestTestGate = Gate<ReqwestTransport>;

	/// Session sink that records every notification for later assertions.
	#[derive(Debug, Default)]
	pub struct RecordingSessionSink {
		rotations: Mutex<Vec<(String, String)>>,
		forced_logouts: AtomicU64,
	}
	impl RecordingSessionSink {
		/// Returns the rotated pairs observed so far.
		pub fn rotations(&self) -> Vec<(String, String)> {
			self.rotations.lock().clone()
		}

		/// Returns how many forced logouts were observed.
		pub fn forced_logouts(&self) -> u64 {
			self.forced_logouts.load(Ordering::Relaxed)
		}
	}
	impl SessionSink for RecordingSessionSink {
		fn on_tokens_rotated(&self, access: &TokenSecret, refresh: &TokenSecret) {
			self.rotations.lock().push((access.expose().into(), refresh.expose().into()));
		}

		fn on_forced_logout(&self) {
			self.forced_logouts.fetch_add(1, Ordering::Relaxed);
		}
	}

	/// Builds a reqwest transport that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_transport() -> ReqwestTransport {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestTransport::with_client(client)
	}

	/// Constructs a [`Gate`] backed by an in-memory store, a recording session sink, and the
	/// reqwest transport used across integration tests.
	pub fn build_reqwest_test_gate(
		descriptor: BackendDescriptor,
	) -> (ReqwestTestGate, Arc<MemoryStore>, Arc<RecordingSessionSink>) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn CredentialStore> = store_backend.clone();
		let session_backend = Arc::new(RecordingSessionSink::default());
		let session: Arc<dyn SessionSink> = session_backend.clone();
		let gate = Gate::with_transport(store, descriptor, session, test_reqwest_transport());

		(gate, store_backend, session_backend)
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::OnceCell as AsyncOnceCell;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use serde_json;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
#[cfg(test)] use refresh_gate as _;
