//! Authentication error taxonomy.

use thiserror::Error;

use crate::store::StoreError;

/// Authentication errors.
///
/// The standalone operations on [`crate::Authenticator`] surface these so
/// callers can react precisely (force a re-login on [`AuthError::Revoked`],
/// answer 503 on [`AuthError::RemoteUnavailable`], retry on
/// [`AuthError::Conflict`]); the combined flow folds every kind into a
/// uniform "unauthenticated" so transports cannot leak which path failed.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The credential does not parse as the expected shape.
    #[error("Malformed credential: {0}")]
    Malformed(String),

    /// Signature verification failed (wrong or rotated secret).
    #[error("Invalid token signature")]
    InvalidSignature,

    /// The credential, or its backing record, is past its expiry.
    #[error("Credential expired")]
    Expired,

    /// The signature is valid but the backing record no longer exists.
    #[error("Token revoked")]
    Revoked,

    /// No record matches the credential.
    #[error("No matching credential record")]
    NotFound,

    /// The principal exists but is archived.
    #[error("User is archived")]
    Archived,

    /// The remote identity provider was unreachable, timed out, or answered
    /// with a non-success status.
    #[error("Identity provider unavailable: {0}")]
    RemoteUnavailable(String),

    /// The remote identity provider answered, but with an unusable identity.
    #[error("Identity provider returned an invalid identity")]
    RemoteInvalidIdentity,

    /// A write raced with an existing record. Retryable.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The credential store failed during a lookup or write.
    #[error("Store error: {0}")]
    Store(String),

    /// Startup or programming defect, e.g. an empty signing secret.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(msg) => AuthError::Conflict(msg),
            StoreError::Unavailable(msg) => AuthError::Store(msg),
        }
    }
}
