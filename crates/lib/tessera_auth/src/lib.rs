//! # tessera_auth
//!
//! Request authentication core for Tessera APIs.
//!
//! Resolves one bearer credential per inbound call to a principal, across
//! four paths: stateless signed access tokens, store-checked refresh
//! tokens, hashed personal access tokens, and a delegated remote identity
//! provider with shadow-account provisioning on first sight.
//!
//! Transport routing, token issuance endpoints, and the storage engine live
//! outside this crate; it consumes a [`store::CredentialStore`]
//! implementation and nothing else.

pub mod authenticator;
pub mod config;
pub mod error;
pub mod models;
pub mod pat;
pub mod remote;
pub mod store;
pub mod token;

pub use authenticator::{AuthResult, Authenticator, Credential, Principal};
pub use config::AuthConfig;
pub use error::AuthError;
pub use models::{NewUser, PatRecord, RefreshTokenRecord, Role, RowStatus, User, UserClaims};
pub use remote::{RemoteIdentity, RemoteIdentityClient};
pub use store::{CredentialStore, StoreError};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
