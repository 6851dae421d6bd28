//! Intercept stage: expiry classification, refresh hand-off, and envelope
//! unwrapping.

// crates.io
use serde::de::DeserializeOwned;
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	http::{RawResponse, Transport},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	pipeline::Gate,
	request::{AUTHORIZATION, RequestDescriptor},
};

impl<C> Gate<C>
where
	C: ?Sized + Transport,
{
	/// Sends one call through the full pipeline.
	///
	/// A 401 on a refreshable path hands off to the refresh coordinator and,
	/// once new credentials are in place, replays the call exactly once with
	/// the rotated token pinned. Success payloads come back with the
	/// conventional `data` envelope stripped.
	pub async fn send(&self, request: RequestDescriptor) -> Result<Value> {
		const KIND: FlowKind = FlowKind::Request;

		let span = FlowSpan::new(KIND, "send");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.send_inner(request)).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Sends one call and deserializes the unwrapped payload into `T`.
	pub async fn send_as<T>(&self, request: RequestDescriptor) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let payload = self.send(request).await?;

		serde_path_to_error::deserialize(payload).map_err(|e| Error::Decode { source: e })
	}

	async fn send_inner(&self, mut request: RequestDescriptor) -> Result<Value> {
		// At most two iterations: the replayed call carries the retried
		// marker, which `should_refresh_for` rejects.
		loop {
			let response = self.dispatch(&request).await?;

			if response.is_success() {
				return Ok(unwrap_envelope(response.body));
			}
			if !self.should_refresh_for(&request, &response) {
				return Err(rejection(response));
			}

			let rotated = self.refresh_access_token().await?;

			request = request.into_retried().with_header(AUTHORIZATION, rotated.access.bearer());
		}
	}

	fn should_refresh_for(&self, request: &RequestDescriptor, response: &RawResponse) -> bool {
		response.is_auth_failure()
			&& !request.is_retried()
			&& !self.descriptor.is_excluded(&request.path)
	}
}

/// Strips the conventional `data` envelope from a success payload.
///
/// Objects yield their `data` member when one is present (an explicit `null`
/// counts as present); anything else passes through unchanged; an absent body
/// becomes an empty object so callers always receive a value.
pub(crate) fn unwrap_envelope(body: Option<Value>) -> Value {
	match body {
		Some(Value::Object(mut object)) => match object.remove("data") {
			Some(data) => data,
			None => Value::Object(object),
		},
		Some(value) => value,
		None => Value::Object(serde_json::Map::new()),
	}
}

fn rejection(response: RawResponse) -> Error {
	Error::Rejected { status: response.status, body: response.body.unwrap_or(Value::Null) }
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	#[test]
	fn unwrap_envelope_strips_the_data_member() {
		assert_eq!(unwrap_envelope(Some(json!({ "data": { "id": 1 } }))), json!({ "id": 1 }));
		assert_eq!(unwrap_envelope(Some(json!({ "data": null }))), Value::Null);
	}

	#[test]
	fn unwrap_envelope_returns_plain_objects_unchanged() {
		assert_eq!(unwrap_envelope(Some(json!({ "id": 1 }))), json!({ "id": 1 }));
	}

	#[test]
	fn unwrap_envelope_passes_non_objects_through() {
		assert_eq!(unwrap_envelope(Some(json!([1, 2, 3]))), json!([1, 2, 3]));
		assert_eq!(unwrap_envelope(Some(json!("ok"))), json!("ok"));
	}

	#[test]
	fn unwrap_envelope_defaults_absent_bodies_to_an_empty_object() {
		assert_eq!(unwrap_envelope(None), json!({}));
	}
}
