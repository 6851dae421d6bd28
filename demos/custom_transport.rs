//! Demonstrates wiring a custom [`Transport`] into the gate and watching a full
//! expiry-refresh-replay cycle without touching a real network.
//!
//! 1. Implement [`Transport`] so backend calls answer from an in-process script.
//! 2. Implement [`SessionSink`] to observe rotation and forced-logout notifications.
//! 3. Build the gate with [`Gate::with_transport`] and send a call whose credential
//!    has already expired; the gate refreshes once and replays it transparently.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use parking_lot::Mutex;
use serde_json::json;
use url::Url;
// self
use refresh_gate::{
	auth::TokenSecret,
	backend::BackendDescriptor,
	http::{Method, RawResponse, Transport, TransportCall, TransportFuture},
	pipeline::Gate,
	request::RequestDescriptor,
	session::SessionSink,
	store::{CredentialStore, MemoryStore},
};

/// Backend stand-in that only honors its current live access token.
///
/// A refresh rotates the live token, so calls carrying the stale bearer fail
/// with 401 until the gate has replayed them with the rotated one.
struct ScriptedBackend {
	live_access: Mutex<String>,
	reject_refresh: bool,
}
impl ScriptedBackend {
	fn new() -> Self {
		Self { live_access: Mutex::new("access-live".into()), reject_refresh: false }
	}

	fn rejecting_refreshes() -> Self {
		Self { live_access: Mutex::new("access-live".into()), reject_refresh: true }
	}
}
impl Transport for ScriptedBackend {
	fn execute(&self, call: TransportCall) -> TransportFuture<'_, RawResponse> {
		Box::pin(async move {
			if call.method == Method::Post && call.url.path().ends_with("/auth/refresh-token") {
				if self.reject_refresh {
					println!("[backend] refresh rejected; the session is gone server-side");

					return Ok(RawResponse { status: 401, body: None });
				}

				let rotated = "access-rotated".to_string();

				println!("[backend] refresh accepted; rotating the live token");

				*self.live_access.lock() = rotated.clone();

				return Ok(RawResponse {
					status: 200,
					body: Some(json!({
						"data": { "accessToken": rotated, "refreshToken": "refresh-rotated" },
					})),
				});
			}

			let expected = format!("Bearer {}", self.live_access.lock());

			if call.headers.get("authorization") == Some(&expected) {
				println!("[backend] {} {} -> 200", call.method, call.url.path());

				Ok(RawResponse {
					status: 200,
					body: Some(json!({ "data": { "report": "weekly", "rows": 3 } })),
				})
			} else {
				println!("[backend] {} {} -> 401 (stale bearer)", call.method, call.url.path());

				Ok(RawResponse { status: 401, body: None })
			}
		})
	}
}

/// Session layer stand-in that narrates every notification it receives.
struct ConsoleSessionSink;
impl SessionSink for ConsoleSessionSink {
	fn on_tokens_rotated(&self, access: &TokenSecret, _refresh: &TokenSecret) {
		println!("[session] tokens rotated; new access token is {:?}", access);
	}

	fn on_forced_logout(&self) {
		println!("[session] forced logout; tearing the UI session down");
	}
}

fn build_gate(transport: ScriptedBackend) -> Result<(Gate<ScriptedBackend>, Arc<MemoryStore>)> {
	let descriptor =
		BackendDescriptor::builder(Url::parse("https://api.example.com/v1")?).build()?;
	let store_backend = Arc::new(MemoryStore::default());
	let store: Arc<dyn CredentialStore> = store_backend.clone();

	store_backend.seed("access-stale", "refresh-live");

	let gate = Gate::with_transport(store, descriptor, Arc::new(ConsoleSessionSink), transport);

	Ok((gate, store_backend))
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let (gate, store) = build_gate(ScriptedBackend::new())?;

	println!("--- expired credential, successful refresh ---");

	let payload = gate.send(RequestDescriptor::get("reports/weekly")).await?;

	println!("[caller] payload arrived: {payload}");
	println!(
		"[caller] refresh episodes: {} attempted, {} succeeded",
		gate.refresh_metrics.attempts(),
		gate.refresh_metrics.successes(),
	);

	let rotated = store
		.access_token_now()
		.ok_or_else(|| color_eyre::eyre::eyre!("store lost the rotated access token"))?;

	println!("[caller] store now holds {rotated:?}");
	println!();
	println!("--- expired credential, refresh rejected ---");

	let (gate, store) = build_gate(ScriptedBackend::rejecting_refreshes())?;

	match gate.send(RequestDescriptor::get("reports/weekly")).await {
		Ok(_) => println!("[caller] unexpected success"),
		Err(error) => println!("[caller] call failed after teardown: {error}"),
	}
	println!("[caller] store cleared: {}", store.access_token_now().is_none());

	Ok(())
}
