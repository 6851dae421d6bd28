//! Backend descriptor data structures and helpers shared by the pipeline.
//!
//! A descriptor names the backend base URL, the refresh endpoint, and the
//! paths that must never trigger a refresh. Validation happens once at build
//! time, so dispatch can resolve request paths without re-checking the base
//! configuration.

// self
use crate::{_prelude::*, error::ConfigError};

/// Paths excluded from refresh handling when none are configured explicitly.
pub const DEFAULT_EXCLUDED_PATHS: [&str; 3] =
	["auth/login", "auth/forgot-password", "auth/reset-password"];
/// Refresh endpoint path used when none is configured explicitly.
pub const DEFAULT_REFRESH_PATH: &str = "auth/refresh-token";

/// Errors raised while constructing or validating backend descriptors.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum BackendDescriptorError {
	/// Backend traffic carries bearer credentials and must use HTTPS.
	#[error("The backend base URL must use HTTPS: {url}.")]
	InsecureBaseUrl {
		/// Base URL that failed validation.
		url: String,
	},
	/// Path does not resolve under the backend base URL.
	#[error("The {role} path {path:?} does not resolve under the backend base URL.")]
	InvalidPath {
		/// Which path failed validation.
		role: &'static str,
		/// Path that failed validation.
		path: String,
	},
	/// Paths must be non-empty after normalization.
	#[error("The {role} path must not be empty.")]
	EmptyPath {
		/// Which path failed validation.
		role: &'static str,
	},
}

/// Immutable backend descriptor consumed by the pipeline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendDescriptor {
	/// Backend base URL; its path always ends with a slash.
	pub base_url: Url,
	/// Normalized refresh endpoint path, relative to [`Self::base_url`].
	pub refresh_path: String,
	/// Absolute refresh endpoint URL, resolved once at build time.
	pub refresh_url: Url,
	/// Normalized paths that never trigger a refresh.
	pub excluded_paths: Vec<String>,
}
impl BackendDescriptor {
	/// Creates a new builder seeded with the provided base URL.
	pub fn builder(base_url: Url) -> BackendDescriptorBuilder {
		BackendDescriptorBuilder::new(base_url)
	}

	/// Resolves a request path against the base URL, keeping any query string.
	pub fn endpoint_url(&self, path: &str) -> Result<Url, ConfigError> {
		self.base_url
			.join(path.trim_start_matches('/'))
			.map_err(|e| ConfigError::InvalidRequestPath { path: path.into(), source: e })
	}

	/// Checks whether a path is barred from triggering a refresh.
	///
	/// The refresh endpoint itself is always barred; a rejected refresh call
	/// must never recurse into another refresh.
	pub fn is_excluded(&self, path: &str) -> bool {
		let normalized = normalize_path(path);

		normalized == self.refresh_path
			|| self.excluded_paths.iter().any(|excluded| excluded == normalized)
	}
}

/// Builder for [`BackendDescriptor`] values.
#[derive(Debug)]
pub struct BackendDescriptorBuilder {
	/// Backend base URL.
	pub base_url: Url,
	/// Refresh endpoint path.
	pub refresh_path: String,
	/// Paths that never trigger a refresh.
	pub excluded_paths: Vec<String>,
}
impl BackendDescriptorBuilder {
	/// Creates a new builder seeded with the provided base URL and the default
	/// refresh and exclusion paths.
	pub fn new(base_url: Url) -> Self {
		Self {
			base_url,
			refresh_path: DEFAULT_REFRESH_PATH.into(),
			excluded_paths: DEFAULT_EXCLUDED_PATHS.iter().map(|path| (*path).into()).collect(),
		}
	}

	/// Overrides the refresh endpoint path.
	pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
		self.refresh_path = path.into();

		self
	}

	/// Bars a single additional path from triggering a refresh.
	///
	/// The default exclusions stay in place; expired credentials must never
	/// send an unauthenticated flow into the refresh endpoint.
	pub fn exclude_path(mut self, path: impl Into<String>) -> Self {
		self.excluded_paths.push(path.into());

		self
	}

	/// Bars multiple additional paths from triggering a refresh.
	pub fn exclude_paths<I>(mut self, paths: I) -> Self
	where
		I: IntoIterator,
		I::Item: Into<String>,
	{
		for path in paths.into_iter() {
			self.excluded_paths.push(path.into());
		}

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<BackendDescriptor, BackendDescriptorError> {
		let mut base_url = self.base_url;

		if base_url.scheme() != "https" {
			return Err(BackendDescriptorError::InsecureBaseUrl { url: base_url.to_string() });
		}
		if !base_url.path().ends_with('/') {
			let path = format!("{}/", base_url.path());

			base_url.set_path(&path);
		}

		let (refresh_path, refresh_url) = validate_path("refresh", &base_url, &self.refresh_path)?;
		let excluded_paths = self
			.excluded_paths
			.iter()
			.map(|path| validate_path("excluded", &base_url, path).map(|(path, _)| path))
			.collect::<Result<Vec<_>, _>>()?;

		Ok(BackendDescriptor { base_url, refresh_path, refresh_url, excluded_paths })
	}
}

/// Strips any leading slashes and trailing query/fragment from a request path.
fn normalize_path(path: &str) -> &str {
	let path = path.trim_start_matches('/');

	path.split_once(['?', '#']).map_or(path, |(clean, _)| clean)
}

fn validate_path(
	role: &'static str,
	base_url: &Url,
	path: &str,
) -> Result<(String, Url), BackendDescriptorError> {
	let normalized = normalize_path(path);

	if normalized.is_empty() {
		return Err(BackendDescriptorError::EmptyPath { role });
	}

	let resolved = base_url
		.join(normalized)
		.map_err(|_| BackendDescriptorError::InvalidPath { role, path: path.into() })?;

	if !resolved.as_str().starts_with(base_url.as_str()) {
		return Err(BackendDescriptorError::InvalidPath { role, path: path.into() });
	}

	Ok((normalized.into(), resolved))
}
