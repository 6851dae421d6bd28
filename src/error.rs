//! Pipeline-level error types shared across dispatch, interception, refresh, and stores.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical pipeline error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Credential refresh failed.
	#[error(transparent)]
	Refresh(#[from] RefreshError),

	/// Backend answered with a status the pipeline does not recover from.
	///
	/// Carries the original status, including terminal 401s from excluded endpoints
	/// or from a call that was already replayed once.
	#[error("Backend rejected the request with HTTP status {status}.")]
	Rejected {
		/// HTTP status code returned by the backend.
		status: u16,
		/// Response body as received; `Value::Null` when the backend sent none.
		body: serde_json::Value,
	},
	/// Response payload did not match the caller-requested type.
	#[error("Response payload did not match the requested type.")]
	Decode {
		/// Structured decoding failure carrying the offending JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}

/// Configuration and validation failures raised while assembling or using the pipeline.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Request path cannot be resolved against the backend base URL.
	#[error("Request path `{path}` cannot be resolved against the backend base URL.")]
	InvalidRequestPath {
		/// Path that failed to resolve.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Backend descriptor validation failed.
	#[error(transparent)]
	Descriptor(#[from] crate::backend::BackendDescriptorError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
///
/// An HTTP response with an error status is not a transport failure; transports
/// resolve those as data and leave classification to the pipeline.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the backend.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the backend.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Failure modes of one credential refresh episode.
///
/// The coordinator settles each episode with a single outcome and hands a clone
/// of it to every caller parked on that episode, so the type stays cheap to
/// clone and carries summaries instead of sources. A failed exchange tears the
/// session down before the error reaches its callers; an
/// [`Abandoned`](Self::Abandoned) episode leaves the session and the stored
/// pair untouched.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum RefreshError {
	/// No stored token pair was available when the refresh started.
	#[error("No stored credential pair is available to refresh.")]
	MissingCredentials,
	/// Refresh endpoint answered with an error status.
	#[error("Backend rejected the refresh call with HTTP status {status}.")]
	Rejected {
		/// HTTP status code returned by the refresh endpoint.
		status: u16,
	},
	/// Refresh endpoint answered without a usable token pair.
	#[error("Refresh endpoint answered without a usable token pair.")]
	InvalidResponse,
	/// Refresh call never produced an HTTP response.
	#[error("Refresh call never reached the backend: {message}.")]
	Unreachable {
		/// Transport failure summary captured for the episode.
		message: String,
	},
	/// Leading caller was dropped before the exchange settled.
	#[error("Refresh episode was abandoned before it settled.")]
	Abandoned,
}
