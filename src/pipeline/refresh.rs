//! Credential refresh orchestration with single-flight episodes and metrics.
//!
//! The gate exposes [`Gate::refresh_access_token`] so callers can rotate the
//! bearer pair without worrying about concurrent expiries. The first caller to
//! find the refresh slot empty becomes the episode leader and performs the
//! exchange; everyone arriving while it runs parks on the episode and adopts
//! the leader's outcome, so exactly one exchange hits the backend per episode.
//! The slot reopens once the episode settles and a later expiry starts fresh.

mod metrics;

pub use metrics::RefreshMetrics;

// crates.io
use serde_json::{Value, json};
// self
use crate::{
	_prelude::*,
	auth::Credential,
	error::RefreshError,
	http::{Method, Transport, TransportCall},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	pipeline::Gate,
};

/// Outcome adopted by every caller parked on a refresh episode.
pub type RefreshOutcome = Result<Credential, RefreshError>;

/// One in-flight refresh shared by every caller that observed an expiry while
/// it ran.
pub(crate) struct RefreshEpisode {
	outcome: AsyncOnceCell<RefreshOutcome>,
}
impl RefreshEpisode {
	fn new() -> Self {
		Self { outcome: AsyncOnceCell::new() }
	}
}

/// Leadership over one in-flight episode.
///
/// Futures are cancelled by drop, so leadership settles the episode either
/// way: [`settle`](Self::settle) once the outcome has been published, or
/// `Drop` when the leading caller was abandoned mid-exchange. The drop path
/// settles every parked caller with [`RefreshError::Abandoned`] and reopens
/// the slot; the stored credentials and the session are left untouched.
struct EpisodeLease<'a, C>
where
	C: ?Sized + Transport,
{
	gate: &'a Gate<C>,
	episode: &'a RefreshEpisode,
	settled: bool,
}
impl<C> EpisodeLease<'_, C>
where
	C: ?Sized + Transport,
{
	/// Disarms the lease once the outcome has been published; the slot reopens
	/// only after the episode settles.
	fn settle(&mut self) {
		self.settled = true;

		*self.gate.refresh_slot.lock() = None;
	}
}
impl<C> Drop for EpisodeLease<'_, C>
where
	C: ?Sized + Transport,
{
	fn drop(&mut self) {
		if self.settled {
			return;
		}

		// A cell that was already set keeps its published outcome; the episode
		// then only needs its slot reopened.
		if self.episode.outcome.set_blocking(Err(RefreshError::Abandoned)).is_ok() {
			self.gate.refresh_metrics.record_failure();
		}

		*self.gate.refresh_slot.lock() = None;
	}
}

impl<C> Gate<C>
where
	C: ?Sized + Transport,
{
	/// Rotates the stored bearer pair, coalescing concurrent callers into a
	/// single refresh episode.
	///
	/// Every caller receives the episode outcome: the rotated pair on success,
	/// or the shared [`RefreshError`] on failure. A failed exchange tears the
	/// session down first. A leader dropped mid-exchange settles the episode
	/// as [`RefreshError::Abandoned`] with the stored pair left in place; the
	/// next caller opens a fresh episode.
	pub async fn refresh_access_token(&self) -> Result<Credential, RefreshError> {
		const KIND: FlowKind = FlowKind::Refresh;

		let span = FlowSpan::new(KIND, "refresh_access_token");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let (episode, leader) = self.join_episode();

				if leader {
					self.refresh_metrics.record_attempt();

					self.lead_episode(&episode).await
				} else {
					self.refresh_metrics.record_coalesced();

					episode.outcome.wait().await.clone()
				}
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Joins the current episode, opening a new one when the slot is empty.
	///
	/// The check-and-set runs synchronously under the slot lock; two callers
	/// can never both come out as leader.
	fn join_episode(&self) -> (Arc<RefreshEpisode>, bool) {
		let mut slot = self.refresh_slot.lock();

		match slot.as_ref() {
			Some(episode) => (episode.clone(), false),
			None => {
				let episode = Arc::new(RefreshEpisode::new());

				*slot = Some(episode.clone());

				(episode, true)
			},
		}
	}

	async fn lead_episode(&self, episode: &RefreshEpisode) -> RefreshOutcome {
		let mut lease = EpisodeLease { gate: self, episode, settled: false };
		let outcome = self.execute_refresh().await;

		match &outcome {
			Ok(_) => {
				self.refresh_metrics.record_success();
				episode.outcome.set(outcome.clone()).await.ok();
			},
			Err(_) => {
				self.refresh_metrics.record_failure();
				// Parked callers settle first; the session is torn down before
				// the error propagates to the triggering caller.
				episode.outcome.set(outcome.clone()).await.ok();
				self.session.on_forced_logout();
				self.clear_credentials().await;
			},
		}

		lease.settle();

		outcome
	}

	/// Performs one refresh-token exchange and applies the rotation.
	async fn execute_refresh(&self) -> RefreshOutcome {
		let access = self.read_access_token().await.ok_or(RefreshError::MissingCredentials)?;
		let refresh = self.read_refresh_token().await.ok_or(RefreshError::MissingCredentials)?;
		let call = TransportCall {
			method: Method::Post,
			url: self.descriptor.refresh_url.clone(),
			headers: BTreeMap::new(),
			body: Some(json!({
				"accessToken": access.expose(),
				"refreshToken": refresh.expose(),
			})),
		};
		let response = self
			.transport
			.execute(call)
			.await
			.map_err(|e| RefreshError::Unreachable { message: e.to_string() })?;

		if !response.is_success() {
			return Err(RefreshError::Rejected { status: response.status });
		}

		let rotated = parse_rotated_pair(response.body).ok_or(RefreshError::InvalidResponse)?;

		self.apply_rotation(&rotated).await;

		Ok(rotated)
	}

	/// Applies a validated rotation: old pair out, session notified, new pair
	/// persisted, default bearer updated.
	async fn apply_rotation(&self, rotated: &Credential) {
		self.clear_credentials().await;
		self.session.on_tokens_rotated(&rotated.access, &rotated.refresh);

		if let Err(err) = self.store.set_access_token(&rotated.access).await {
			obs::warn_store_degraded("set_access_token", &err);
		}
		if let Err(err) = self.store.set_refresh_token(&rotated.refresh).await {
			obs::warn_store_degraded("set_refresh_token", &err);
		}

		*self.default_bearer.write() = Some(rotated.access.clone());
	}
}

/// Extracts the rotated pair from a refresh response body.
///
/// Accepts both the flat shape and the same shape nested one level under
/// `data`. Both tokens must be present as non-empty strings.
fn parse_rotated_pair(body: Option<Value>) -> Option<Credential> {
	let body = body?;
	let payload = match body.get("data") {
		Some(data @ Value::Object(_)) => data,
		_ => &body,
	};
	let access = non_empty_str(payload.get("accessToken")?)?;
	let refresh = non_empty_str(payload.get("refreshToken")?)?;

	Some(Credential::new(access, refresh))
}

fn non_empty_str(value: &Value) -> Option<&str> {
	value.as_str().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn parse_rotated_pair_accepts_the_flat_shape() {
		let pair = parse_rotated_pair(Some(json!({
			"accessToken": "new-access",
			"refreshToken": "new-refresh",
		})))
		.expect("Pair must parse.");

		assert_eq!(pair, Credential::new("new-access", "new-refresh"));
	}

	#[test]
	fn parse_rotated_pair_accepts_the_data_nested_shape() {
		let pair = parse_rotated_pair(Some(json!({
			"data": { "accessToken": "new-access", "refreshToken": "new-refresh" },
		})))
		.expect("Pair must parse.");

		assert_eq!(pair, Credential::new("new-access", "new-refresh"));
	}

	#[test]
	fn parse_rotated_pair_rejects_missing_or_empty_fields() {
		assert_eq!(parse_rotated_pair(None), None);
		assert_eq!(parse_rotated_pair(Some(json!({ "accessToken": "only-half" }))), None);
		assert_eq!(
			parse_rotated_pair(Some(json!({ "accessToken": "", "refreshToken": "r" }))),
			None
		);
		assert_eq!(
			parse_rotated_pair(Some(json!({ "accessToken": 42, "refreshToken": "r" }))),
			None
		);
	}
}
