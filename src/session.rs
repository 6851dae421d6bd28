//! Session lifecycle notifications emitted by the pipeline.

// self
use crate::auth::TokenSecret;

/// Observer for session lifecycle events.
///
/// Implementations receive fire-and-forget notifications: the pipeline calls
/// them synchronously while a refresh episode settles and ignores anything
/// they do, so they must not block. Rotation fires before the rotated pair is
/// persisted; forced logout fires before stored credentials are cleared, so a
/// sink can still read them for teardown bookkeeping.
pub trait SessionSink
where
	Self: Send + Sync,
{
	/// Called with the new token pair after a refresh succeeds.
	fn on_tokens_rotated(&self, access: &TokenSecret, refresh: &TokenSecret);

	/// Called when a refresh fails and the session must be torn down.
	fn on_forced_logout(&self);
}

/// Sink that ignores every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSessionSink;
impl SessionSink for NullSessionSink {
	fn on_tokens_rotated(&self, _: &TokenSecret, _: &TokenSecret) {}

	fn on_forced_logout(&self) {}
}
