//! Credential store abstraction.
//!
//! The authenticator never talks to a database directly; it consumes these
//! operations through a trait object so the backing store (SQL, KV, a
//! remote service) can live in another crate. [`memory::MemoryStore`] is the
//! in-process reference implementation used by tests and embedders without
//! durability needs.

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{NewUser, PatRecord, RefreshTokenRecord, User};

/// Errors a store implementation may surface.
///
/// Absence is not an error: lookups return `Ok(None)` when nothing matches,
/// and the authenticator decides what that means per path.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A write raced with an existing record (e.g. a username uniqueness
    /// violation).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The backend failed or is unreachable.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Store operations the authenticator depends on.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up a refresh token record by owner and token identifier.
    async fn refresh_token_by_id(
        &self,
        user_id: i64,
        token_id: &str,
    ) -> Result<Option<RefreshTokenRecord>, StoreError>;

    /// Look up a user by numeric ID.
    async fn user_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;

    /// Look up a user by unique username.
    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Look up a user and PAT record by the token's SHA-256 hash.
    ///
    /// Implementations only ever see the hash; raw secrets must not reach
    /// the store.
    async fn user_by_pat_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<(User, PatRecord)>, StoreError>;

    /// Create a user, assigning its ID. Username collisions are
    /// [`StoreError::Conflict`].
    async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError>;

    /// Record when a PAT was last used. Advisory telemetry: last write
    /// wins, and a missing record is not an error.
    async fn touch_pat_last_used(
        &self,
        user_id: i64,
        token_id: &str,
        used_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), StoreError>;
}
