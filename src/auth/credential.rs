//! The stored token pair driving one authenticated session.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Access + refresh token pair representing one authenticated session.
///
/// Exactly one live pair exists per session; it is absent when logged out and
/// rotated only by a successful refresh episode or by the login flow.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
	/// Short-lived token attached to outgoing requests.
	pub access: TokenSecret,
	/// Longer-lived token spent to obtain a new pair.
	pub refresh: TokenSecret,
}
impl Credential {
	/// Builds a pair from the provided raw token values.
	pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
		Self { access: TokenSecret::new(access), refresh: TokenSecret::new(refresh) }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn credential_debug_redacts_both_tokens() {
		let pair = Credential::new("access-raw", "refresh-raw");
		let rendered = format!("{pair:?}");

		assert!(!rendered.contains("access-raw"));
		assert!(!rendered.contains("refresh-raw"));
	}
}
