// std
use std::{
	env, fs,
	path::PathBuf,
	process,
	sync::Arc,
	time::{SystemTime, UNIX_EPOCH},
};
// self
use refresh_gate::{
	auth::TokenSecret,
	store::{CredentialStore, FileStore, MemoryStore, StoreError},
};

fn temp_path(label: &str) -> PathBuf {
	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("Failed to read the system clock for store tests.")
		.as_nanos();
	let unique = format!("refresh_gate_{label}_{}_{nanos}.json", process::id());

	env::temp_dir().join(unique)
}

async fn exercise_round_trip(store: Arc<dyn CredentialStore>) {
	let access = TokenSecret::new("access-round-trip");
	let refresh = TokenSecret::new("refresh-round-trip");

	store.set_access_token(&access).await.expect("Storing the access token should succeed.");
	store.set_refresh_token(&refresh).await.expect("Storing the refresh token should succeed.");

	let fetched = store
		.access_token()
		.await
		.expect("Reading the access token back should succeed.")
		.expect("Stored access token should remain present.");

	assert_eq!(fetched.expose(), "access-round-trip");

	let fetched = store
		.refresh_token()
		.await
		.expect("Reading the refresh token back should succeed.")
		.expect("Stored refresh token should remain present.");

	assert_eq!(fetched.expose(), "refresh-round-trip");

	store.clear_access_token().await.expect("Clearing the access token should succeed.");

	let cleared =
		store.access_token().await.expect("Reading a cleared access slot should succeed.");

	assert!(cleared.is_none());

	let survivor = store
		.refresh_token()
		.await
		.expect("Reading the refresh token after a partial clear should succeed.")
		.expect("Refresh token should survive clearing the access slot.");

	assert_eq!(survivor.expose(), "refresh-round-trip");
}

#[tokio::test]
async fn memory_store_round_trips_through_the_trait_object() {
	exercise_round_trip(Arc::new(MemoryStore::default())).await;
}

#[tokio::test]
async fn file_store_round_trips_through_the_trait_object() {
	let path = temp_path("trait_round_trip");
	let store =
		FileStore::open(&path).expect("Opening a file store at a fresh path should succeed.");

	exercise_round_trip(Arc::new(store)).await;

	fs::remove_file(&path).unwrap_or_else(|e| {
		panic!("Failed to remove temporary store snapshot {}: {e}", path.display())
	});
}

#[tokio::test]
async fn file_store_opens_clean_without_a_snapshot() {
	let path = temp_path("missing_snapshot");
	let store =
		FileStore::open(&path).expect("Opening a file store at a missing path should succeed.");

	assert!(store.last_updated_at().is_none());

	let access =
		store.access_token().await.expect("Reading an access token from an empty store should succeed.");

	assert!(access.is_none());

	let refresh = store
		.refresh_token()
		.await
		.expect("Reading a refresh token from an empty store should succeed.");

	assert!(refresh.is_none());
}

#[tokio::test]
async fn file_store_rejects_a_corrupt_snapshot() {
	let path = temp_path("corrupt_snapshot");

	fs::write(&path, b"definitely not a snapshot").unwrap_or_else(|e| {
		panic!("Failed to plant a corrupt snapshot at {}: {e}", path.display())
	});

	let err = FileStore::open(&path)
		.expect_err("Opening a corrupt snapshot should surface a serialization error.");

	assert!(matches!(err, StoreError::Serialization { .. }));

	fs::remove_file(&path).unwrap_or_else(|e| {
		panic!("Failed to remove temporary store snapshot {}: {e}", path.display())
	});
}

#[tokio::test]
async fn concurrent_writers_land_both_slots() {
	let store = MemoryStore::default();
	let writer_a = store.clone();
	let writer_b = store.clone();
	let task_a = tokio::spawn(async move {
		writer_a
			.set_access_token(&TokenSecret::new("access-concurrent"))
			.await
			.expect("Concurrent access-token write should succeed.");
	});
	let task_b = tokio::spawn(async move {
		writer_b
			.set_refresh_token(&TokenSecret::new("refresh-concurrent"))
			.await
			.expect("Concurrent refresh-token write should succeed.");
	});
	let (done_a, done_b) = tokio::join!(task_a, task_b);

	done_a.expect("Access-token writer should not panic.");
	done_b.expect("Refresh-token writer should not panic.");

	let access = store
		.access_token_now()
		.expect("Access token should be present after concurrent writes.");
	let refresh = store
		.refresh_token_now()
		.expect("Refresh token should be present after concurrent writes.");

	assert_eq!(access.expose(), "access-concurrent");
	assert_eq!(refresh.expose(), "refresh-concurrent");
}
