//! Demonstrates the default reqwest stack riding out an expired access token:
//! the gate hits a 401, coalesces into one refresh call, and replays the
//! original request with the rotated bearer while the caller sees a single
//! successful response.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
use url::Url;
// self
use refresh_gate::{
	auth::TokenSecret,
	backend::BackendDescriptor,
	http::ReqwestTransport,
	pipeline::Gate,
	reqwest::Client,
	request::RequestDescriptor,
	session::SessionSink,
	store::{CredentialStore, MemoryStore},
};

struct ConsoleSessionSink;
impl SessionSink for ConsoleSessionSink {
	fn on_tokens_rotated(&self, _access: &TokenSecret, _refresh: &TokenSecret) {
		println!("[session] tokens rotated");
	}

	fn on_forced_logout(&self) {
		println!("[session] forced logout");
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let expired_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/v1/profile")
				.header("authorization", "Bearer access-stale");
			then.status(401);
		})
		.await;
	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/v1/auth/refresh-token");
			then.status(200).json_body(json!({
				"data": { "accessToken": "access-fresh", "refreshToken": "refresh-fresh" },
			}));
		})
		.await;
	let replayed_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/v1/profile")
				.header("authorization", "Bearer access-fresh");
			then.status(200).json_body(json!({
				"data": { "name": "Ada", "plan": "pro" },
			}));
		})
		.await;
	let descriptor = BackendDescriptor::builder(Url::parse(&server.url("/v1"))?).build()?;
	let store_backend = Arc::new(MemoryStore::default());
	let store: Arc<dyn CredentialStore> = store_backend.clone();

	store_backend.seed("access-stale", "refresh-stale");

	let transport = ReqwestTransport::with_client(
		Client::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()?,
	);
	let gate = Gate::with_transport(store, descriptor, Arc::new(ConsoleSessionSink), transport);
	let profile = gate.send(RequestDescriptor::get("profile")).await?;

	println!("[caller] profile payload: {profile}");
	println!(
		"[caller] one refresh episode: {} attempted, {} succeeded, {} coalesced",
		gate.refresh_metrics.attempts(),
		gate.refresh_metrics.successes(),
		gate.refresh_metrics.coalesced(),
	);

	expired_mock.assert_async().await;
	refresh_mock.assert_async().await;
	replayed_mock.assert_async().await;

	Ok(())
}
