//! Authentication module
//!
//! Supports: API Key, Basic, Bearer, Custom Headers
//!
//! The `Authenticator` applies static credentials to outgoing requests.
//! `CredentialResolver` finds API keys for handlers that need one per call.

mod authenticator;
mod credentials;
mod types;

pub use authenticator::{extract_jsonpath, Authenticator};
pub use credentials::{CredentialResolver, DefaultCredentials, StaticCredentials};
pub use types::{AuthConfig, Location};

#[cfg(test)]
mod tests;
