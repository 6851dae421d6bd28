#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use refresh_gate::{
	_preludet::*,
	auth::TokenSecret,
	backend::BackendDescriptor,
	request::RequestDescriptor,
	serde_json::json,
};

fn build_descriptor(server: &MockServer) -> BackendDescriptor {
	BackendDescriptor::builder(
		Url::parse(&server.url("/v1")).expect("Mock base URL should parse successfully."),
	)
	.build()
	.expect("Backend descriptor should build successfully.")
}

#[tokio::test]
async fn send_unwraps_the_data_envelope() {
	let server = MockServer::start_async().await;
	let (gate, store, _session) = build_reqwest_test_gate(build_descriptor(&server));

	store.seed("access", "refresh");

	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/boards");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"data\":{\"items\":[\"a\",\"b\"]}}");
		})
		.await;
	let payload = gate
		.send(RequestDescriptor::get("boards"))
		.await
		.expect("Enveloped payload should unwrap successfully.");

	mock.assert_async().await;

	assert_eq!(payload, json!({ "items": ["a", "b"] }));
}

#[tokio::test]
async fn send_returns_plain_payloads_unchanged() {
	let server = MockServer::start_async().await;
	let (gate, store, _session) = build_reqwest_test_gate(build_descriptor(&server));

	store.seed("access", "refresh");

	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/profile");
			then.status(200).header("content-type", "application/json").body("{\"id\":7}");
		})
		.await;
	let payload = gate
		.send(RequestDescriptor::get("profile"))
		.await
		.expect("Plain payload should pass through successfully.");

	mock.assert_async().await;

	assert_eq!(payload, json!({ "id": 7 }));
}

#[tokio::test]
async fn send_defaults_empty_bodies_to_an_empty_object() {
	let server = MockServer::start_async().await;
	let (gate, store, _session) = build_reqwest_test_gate(build_descriptor(&server));

	store.seed("access", "refresh");

	let mock = server
		.mock_async(|when, then| {
			when.method(DELETE).path("/v1/boards/7");
			then.status(204);
		})
		.await;
	let payload = gate
		.send(RequestDescriptor::delete("boards/7"))
		.await
		.expect("Bodyless success should yield the empty-object fallback.");

	mock.assert_async().await;

	assert_eq!(payload, json!({}));
}

#[tokio::test]
async fn excluded_endpoints_never_trigger_a_refresh() {
	let server = MockServer::start_async().await;
	let (gate, store, session) = build_reqwest_test_gate(build_descriptor(&server));

	store.seed("access-current", "refresh-current");

	let rejected_login = server
		.mock_async(|when, then| {
			when.method(POST).path("/v1/auth/forgot-password");
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"message\":\"unknown account\"}");
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/v1/auth/refresh-token");
			then.status(200);
		})
		.await;
	let err = gate
		.send(
			RequestDescriptor::post("auth/forgot-password")
				.with_json(json!({ "email": "user@example.com" })),
		)
		.await
		.expect_err("A 401 from an excluded endpoint should propagate unchanged.");

	match err {
		Error::Rejected { status, body } => {
			assert_eq!(status, 401);
			assert_eq!(body, json!({ "message": "unknown account" }));
		},
		other => panic!("Expected a rejection, got: {other:?}."),
	}

	rejected_login.assert_async().await;
	refresh.assert_calls_async(0).await;

	// The stored pair survives; a credential-entry error is not an expired session.
	assert_eq!(store.access_token_now(), Some(TokenSecret::new("access-current")));
	assert_eq!(session.forced_logouts(), 0);
}

#[tokio::test]
async fn non_auth_failures_propagate_unchanged() {
	let server = MockServer::start_async().await;
	let (gate, store, _session) = build_reqwest_test_gate(build_descriptor(&server));

	store.seed("access", "refresh");

	let failing = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/reports");
			then.status(500)
				.header("content-type", "application/json")
				.body("{\"message\":\"backend exploded\"}");
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/v1/auth/refresh-token");
			then.status(200);
		})
		.await;
	let err = gate
		.send(RequestDescriptor::get("reports"))
		.await
		.expect_err("A 500 should propagate without touching the refresh flow.");

	assert!(matches!(err, Error::Rejected { status: 500, .. }));

	failing.assert_async().await;
	refresh.assert_calls_async(0).await;
}

#[tokio::test]
async fn dispatch_attaches_the_stored_access_token() {
	let server = MockServer::start_async().await;
	let (gate, store, _session) = build_reqwest_test_gate(build_descriptor(&server));

	store.seed("seeded-access", "seeded-refresh");

	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/whoami").header("authorization", "Bearer seeded-access");
			then.status(200).header("content-type", "application/json").body("{\"data\":true}");
		})
		.await;
	let payload = gate
		.send(RequestDescriptor::get("whoami"))
		.await
		.expect("Authenticated call should succeed.");

	mock.assert_async().await;

	assert_eq!(payload, json!(true));
}

#[tokio::test]
async fn caller_pinned_authorization_header_survives_without_stored_token() {
	let server = MockServer::start_async().await;
	let (gate, _store, _session) = build_reqwest_test_gate(build_descriptor(&server));
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/public/ping").header("authorization", "Basic Zm9vOmJhcg==");
			then.status(200);
		})
		.await;

	gate.send(RequestDescriptor::get("public/ping").with_header("Authorization", "Basic Zm9vOmJhcg=="))
		.await
		.expect("Pinned header should reach the backend untouched.");

	mock.assert_async().await;
}

#[tokio::test]
async fn stale_pinned_header_is_replaced_by_the_stored_token() {
	let server = MockServer::start_async().await;
	let (gate, store, _session) = build_reqwest_test_gate(build_descriptor(&server));

	store.seed("access-current", "refresh-current");

	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/whoami").header("authorization", "Bearer access-current");
			then.status(200);
		})
		.await;

	gate.send(RequestDescriptor::get("whoami").with_header("authorization", "Bearer access-stale"))
		.await
		.expect("Stale pinned header should be replaced by the current token.");

	mock.assert_async().await;
}

#[tokio::test]
async fn default_bearer_backfills_an_empty_store() {
	let server = MockServer::start_async().await;
	let (gate, _store, _session) = build_reqwest_test_gate(build_descriptor(&server));
	let gate = gate.with_default_bearer(TokenSecret::new("fallback-token"));
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/whoami").header("authorization", "Bearer fallback-token");
			then.status(200);
		})
		.await;

	gate.send(RequestDescriptor::get("whoami"))
		.await
		.expect("Fallback bearer should authenticate the call.");

	mock.assert_async().await;
}

#[tokio::test]
async fn send_as_decodes_the_unwrapped_payload() {
	let server = MockServer::start_async().await;
	let (gate, store, _session) = build_reqwest_test_gate(build_descriptor(&server));

	store.seed("access", "refresh");

	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/stats");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"data\":{\"closed\":5,\"open\":3}}");
		})
		.await;
	let stats: BTreeMap<String, u64> = gate
		.send_as(RequestDescriptor::get("stats"))
		.await
		.expect("Stats payload should decode into a map.");

	mock.assert_async().await;

	assert_eq!(stats, BTreeMap::from([("closed".to_owned(), 5), ("open".to_owned(), 3)]));
}

#[tokio::test]
async fn send_as_surfaces_decode_failures() {
	let server = MockServer::start_async().await;
	let (gate, store, _session) = build_reqwest_test_gate(build_descriptor(&server));

	store.seed("access", "refresh");

	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/stats");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"data\":{\"open\":3}}");
		})
		.await;
	let err = gate
		.send_as::<Vec<u64>>(RequestDescriptor::get("stats"))
		.await
		.expect_err("An object payload should not decode into a list.");

	mock.assert_async().await;

	assert!(matches!(err, Error::Decode { .. }));
}

#[tokio::test]
async fn logout_clears_stored_credentials_without_notifications() {
	let descriptor = BackendDescriptor::builder(
		Url::parse("https://api.example.com/v1").expect("Base URL should parse successfully."),
	)
	.build()
	.expect("Backend descriptor should build successfully.");
	let (gate, store, session) = build_reqwest_test_gate(descriptor);

	store.seed("access", "refresh");
	gate.logout().await;

	assert_eq!(store.access_token_now(), None);
	assert_eq!(store.refresh_token_now(), None);
	assert_eq!(session.forced_logouts(), 0);
	assert!(session.rotations().is_empty());
}
