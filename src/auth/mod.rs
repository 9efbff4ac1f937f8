//! Authentication module
//!
//! Supports: Private token, OAuth bearer token, CI job token, OAuth password
//! grant, and custom headers.
//!
//! The `Authenticator` attaches credentials to every outbound request and
//! caches the access token obtained through the password grant.

mod authenticator;
mod types;

pub(crate) use authenticator::apply_static;
pub use authenticator::Authenticator;
pub use types::{AuthConfig, CachedToken, TokenType};
pub(crate) use types::REDACTED;

#[cfg(test)]
mod tests;
