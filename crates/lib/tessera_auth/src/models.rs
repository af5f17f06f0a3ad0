//! Authentication domain models.
//!
//! These are internal domain models shared by every authentication path;
//! persistence and API-facing representations live outside this crate.

use serde::{Deserialize, Serialize};

/// Account role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

/// Lifecycle status of a user row.
///
/// Archived users keep their rows (and credentials) but must fail
/// authentication on every path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowStatus {
    #[default]
    Normal,
    Archived,
}

/// Domain user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    /// Unique login name; also the join key for remote identities.
    pub username: String,
    pub nickname: String,
    pub email: String,
    /// Password hash, or empty when password login is disabled
    /// (shadow accounts never get one).
    pub password_hash: String,
    pub role: Role,
    pub row_status: RowStatus,
}

/// Payload for creating a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub nickname: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub row_status: RowStatus,
}

impl NewUser {
    /// Shadow account provisioned for a remote identity on first sight.
    ///
    /// The empty password hash permanently disables password login; the
    /// remote provider stays the only way in for such accounts.
    pub fn shadow(username: &str) -> Self {
        Self {
            username: username.to_string(),
            nickname: username.to_string(),
            email: String::new(),
            password_hash: String::new(),
            role: Role::User,
            row_status: RowStatus::Normal,
        }
    }
}

/// Refresh token record stored by the credential store.
///
/// Presence of the row is the source of truth for revocation: a refresh
/// token whose row is gone is revoked no matter how valid its signature is.
#[derive(Debug, Clone)]
pub struct RefreshTokenRecord {
    /// Matches the `jti` claim of the signed refresh token.
    pub token_id: String,
    pub user_id: i64,
    /// `None` means the record never expires on its own.
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Personal access token record stored by the credential store.
///
/// Only the SHA-256 hash of the token ever reaches storage; the secret is
/// shown once at mint time and never kept.
#[derive(Debug, Clone)]
pub struct PatRecord {
    pub token_id: String,
    /// Operator-facing label (e.g. "ci-deploy").
    pub name: String,
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
    /// Advisory usage telemetry, updated out of band.
    pub last_used_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Verified principal extracted from an access token.
///
/// Carries everything the stateless path knows about the caller; no store
/// row backs these fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserClaims {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
    pub status: RowStatus,
}
