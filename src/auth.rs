//! Auth-domain models: redacted token secrets and the session's credential pair.

pub mod credential;
pub mod secret;

pub use credential::*;
pub use secret::*;
