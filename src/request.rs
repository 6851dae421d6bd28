//! Request descriptors submitted to the pipeline.

// self
use crate::{_prelude::*, http::Method};

/// Lowercase name of the header carrying the bearer credential.
pub const AUTHORIZATION: &str = "authorization";

/// One API call described independently of any HTTP client.
///
/// Header names are lowercased on insertion so the attachment and replay rules
/// can compare them reliably. The replay marker is set by the pipeline when a
/// call re-enters dispatch after a refresh and is never cleared; a marked call
/// that fails again terminates instead of looping.
#[derive(Clone, Debug)]
pub struct RequestDescriptor {
	/// HTTP method.
	pub method: Method,
	/// Backend-relative path, resolved against the configured base URL at dispatch time.
	pub path: String,
	/// Header map with lowercase names.
	pub headers: BTreeMap<String, String>,
	/// Optional JSON body.
	pub body: Option<serde_json::Value>,
	retried: bool,
}
impl RequestDescriptor {
	/// Creates a descriptor for the provided method + path.
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self { method, path: path.into(), headers: BTreeMap::new(), body: None, retried: false }
	}

	/// Creates a GET descriptor.
	pub fn get(path: impl Into<String>) -> Self {
		Self::new(Method::Get, path)
	}

	/// Creates a POST descriptor.
	pub fn post(path: impl Into<String>) -> Self {
		Self::new(Method::Post, path)
	}

	/// Creates a PUT descriptor.
	pub fn put(path: impl Into<String>) -> Self {
		Self::new(Method::Put, path)
	}

	/// Creates a PATCH descriptor.
	pub fn patch(path: impl Into<String>) -> Self {
		Self::new(Method::Patch, path)
	}

	/// Creates a DELETE descriptor.
	pub fn delete(path: impl Into<String>) -> Self {
		Self::new(Method::Delete, path)
	}

	/// Attaches a JSON body.
	pub fn with_json(mut self, body: serde_json::Value) -> Self {
		self.body = Some(body);

		self
	}

	/// Sets a header, lowercasing its name.
	pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
		self.headers.insert(name.as_ref().to_ascii_lowercase(), value.into());

		self
	}

	/// Whether this call was already replayed once after a refresh.
	pub fn is_retried(&self) -> bool {
		self.retried
	}

	pub(crate) fn into_retried(mut self) -> Self {
		self.retried = true;

		self
	}
}
