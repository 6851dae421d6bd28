//! Transport primitives for backend calls.
//!
//! The module exposes [`Transport`] alongside [`TransportCall`] and [`RawResponse`] so
//! downstream crates can integrate custom HTTP clients without touching the refresh
//! machinery. A transport resolves with [`RawResponse`] for every answer the backend
//! produces; `Err` is reserved for failures where no HTTP status exists at all (DNS,
//! TCP, TLS, timeouts). Status classification stays with the pipeline.

// std
use std::ops::Deref;
// self
use crate::{_prelude::*, error::TransportError};

/// Future type returned by [`Transport`] implementations.
pub type TransportFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing backend calls.
///
/// The trait is the pipeline's only dependency on an HTTP stack. Callers provide
/// an implementation (typically behind `Arc<T>` where `T: Transport`) and the
/// pipeline dispatches fully-resolved calls through it. Implementations must be
/// `Send + Sync + 'static` so one transport serves every clone of a gate, and the
/// futures they return must be `Send` so replay loops can hop executors.
pub trait Transport
where
	Self: 'static + Send + Sync,
{
	/// Executes one HTTP call against the backend.
	fn execute(&self, call: TransportCall) -> TransportFuture<'_, RawResponse>;
}

/// HTTP methods supported by the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
	/// HTTP GET.
	Get,
	/// HTTP POST.
	Post,
	/// HTTP PUT.
	Put,
	/// HTTP PATCH.
	Patch,
	/// HTTP DELETE.
	Delete,
}
impl Method {
	/// Returns the canonical uppercase method name.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Patch => "PATCH",
			Method::Delete => "DELETE",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
#[cfg(feature = "reqwest")]
impl From<Method> for reqwest::Method {
	fn from(method: Method) -> Self {
		match method {
			Method::Get => reqwest::Method::GET,
			Method::Post => reqwest::Method::POST,
			Method::Put => reqwest::Method::PUT,
			Method::Patch => reqwest::Method::PATCH,
			Method::Delete => reqwest::Method::DELETE,
		}
	}
}

/// Fully-resolved HTTP call handed to a [`Transport`].
#[derive(Clone, Debug)]
pub struct TransportCall {
	/// HTTP method to execute.
	pub method: Method,
	/// Absolute URL, already resolved against the backend base.
	pub url: Url,
	/// Header map with lowercase names, including the authorization header when attached.
	pub headers: BTreeMap<String, String>,
	/// Optional JSON body.
	pub body: Option<serde_json::Value>,
}

/// Backend answer carried back through the pipeline.
#[derive(Clone, Debug)]
pub struct RawResponse {
	/// HTTP status code.
	pub status: u16,
	/// Decoded JSON body; `None` when the backend sent nothing decodable.
	pub body: Option<serde_json::Value>,
}
impl RawResponse {
	/// Whether the status falls in the 2xx success range.
	pub fn is_success(&self) -> bool {
		(200..=299).contains(&self.status)
	}

	/// Whether the status signals an expired or rejected credential.
	pub fn is_auth_failure(&self) -> bool {
		self.status == 401
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
/// The pipeline serializes bodies itself, so any pre-configured [`ReqwestClient`]
/// (proxies, timeouts, custom TLS) can be dropped in via [`ReqwestTransport::with_client`].
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Transport for ReqwestTransport {
	fn execute(&self, call: TransportCall) -> TransportFuture<'_, RawResponse> {
		let client = self.0.clone();

		Box::pin(async move {
			let mut request = client.request(call.method.into(), call.url);

			for (name, value) in &call.headers {
				request = request.header(name, value);
			}
			if let Some(body) = &call.body {
				let payload = serde_json::to_vec(body).map_err(TransportError::network)?;

				if !call.headers.contains_key("content-type") {
					request = request.header("content-type", "application/json");
				}

				request = request.body(payload);
			}

			let response = request.send().await.map_err(TransportError::from)?;
			let status = response.status().as_u16();
			let bytes = response.bytes().await.map_err(TransportError::from)?;
			// Non-JSON bodies (HTML error pages, empty 204s) decode to an absent body;
			// the pipeline decides what that means.
			let body =
				if bytes.is_empty() { None } else { serde_json::from_slice(&bytes).ok() };

			Ok(RawResponse { status, body })
		})
	}
}
