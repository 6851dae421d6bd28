//! Dispatch stage: path resolution + bearer attachment.

// self
use crate::{
	_prelude::*,
	http::{RawResponse, Transport, TransportCall},
	pipeline::Gate,
	request::{AUTHORIZATION, RequestDescriptor},
};

impl<C> Gate<C>
where
	C: ?Sized + Transport,
{
	/// Resolves, authenticates, and executes one call without inspecting the
	/// response.
	///
	/// Most callers want [`Gate::send`] instead; this stage never refreshes or
	/// replays, so an expired credential surfaces as the raw 401.
	pub async fn dispatch(&self, request: &RequestDescriptor) -> Result<RawResponse> {
		let url = self.descriptor.endpoint_url(&request.path)?;
		let mut headers = request.headers.clone();

		self.attach_bearer(&mut headers).await;

		let call = TransportCall { method: request.method, url, headers, body: request.body.clone() };
		let response = self.transport.execute(call).await?;

		Ok(response)
	}

	/// Attaches the current access token as a bearer header.
	///
	/// A caller-pinned header survives when it already carries the current
	/// token (custom schemes stay intact) or when no token is available at
	/// all; otherwise the stored token wins over whatever the caller set.
	async fn attach_bearer(&self, headers: &mut BTreeMap<String, String>) {
		if let Some(token) = self.read_access_token().await {
			let pinned =
				headers.get(AUTHORIZATION).is_some_and(|existing| token.appears_in(existing));

			if !pinned {
				headers.insert(AUTHORIZATION.into(), token.bearer());
			}

			return;
		}
		if headers.contains_key(AUTHORIZATION) {
			return;
		}
		if let Some(fallback) = self.default_bearer.read().clone() {
			headers.insert(AUTHORIZATION.into(), fallback.bearer());
		}
	}
}
