//! In-memory credential store.
//!
//! Reference [`CredentialStore`] backed by `DashMap`s. Used by the test
//! suite and by embedders that want authentication without a database;
//! nothing here survives a restart.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use super::{CredentialStore, StoreError};
use crate::models::{NewUser, PatRecord, RefreshTokenRecord, User};

/// A stored PAT, keyed externally by its token hash.
#[derive(Debug, Clone)]
struct PatEntry {
    user_id: i64,
    record: PatRecord,
}

/// In-memory credential store.
pub struct MemoryStore {
    users: DashMap<i64, User>,
    /// Username → user ID index, enforcing uniqueness.
    usernames: DashMap<String, i64>,
    /// Keyed by `(user_id, token_id)`.
    refresh_tokens: DashMap<(i64, String), RefreshTokenRecord>,
    /// Keyed by token hash.
    pats: DashMap<String, PatEntry>,
    next_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            usernames: DashMap::new(),
            refresh_tokens: DashMap::new(),
            pats: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    /// Seed a fully-formed user (the caller picks the ID).
    ///
    /// Subsequent [`CredentialStore::create_user`] calls keep assigning IDs
    /// above any seeded one.
    pub fn add_user(&self, user: User) {
        self.next_id.fetch_max(user.id + 1, Ordering::SeqCst);
        self.usernames.insert(user.username.clone(), user.id);
        self.users.insert(user.id, user);
    }

    /// Seed a refresh token record.
    pub fn add_refresh_token(&self, record: RefreshTokenRecord) {
        self.refresh_tokens
            .insert((record.user_id, record.token_id.clone()), record);
    }

    /// Delete a refresh token record, revoking the matching token.
    /// Returns whether a record existed.
    pub fn remove_refresh_token(&self, user_id: i64, token_id: &str) -> bool {
        self.refresh_tokens
            .remove(&(user_id, token_id.to_string()))
            .is_some()
    }

    /// Seed a PAT record under its token hash.
    pub fn add_pat(&self, user_id: i64, token_hash: &str, record: PatRecord) {
        self.pats
            .insert(token_hash.to_string(), PatEntry { user_id, record });
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn refresh_token_by_id(
        &self,
        user_id: i64,
        token_id: &str,
    ) -> Result<Option<RefreshTokenRecord>, StoreError> {
        Ok(self
            .refresh_tokens
            .get(&(user_id, token_id.to_string()))
            .map(|r| r.clone()))
    }

    async fn user_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let Some(id) = self.usernames.get(username).map(|id| *id) else {
            return Ok(None);
        };
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn user_by_pat_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<(User, PatRecord)>, StoreError> {
        let Some(entry) = self.pats.get(token_hash).map(|e| e.clone()) else {
            return Ok(None);
        };
        Ok(self
            .users
            .get(&entry.user_id)
            .map(|u| (u.clone(), entry.record)))
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        match self.usernames.entry(new_user.username.clone()) {
            Entry::Occupied(_) => Err(StoreError::Conflict(format!(
                "username {:?} already exists",
                new_user.username
            ))),
            Entry::Vacant(slot) => {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                let user = User {
                    id,
                    username: new_user.username,
                    nickname: new_user.nickname,
                    email: new_user.email,
                    password_hash: new_user.password_hash,
                    role: new_user.role,
                    row_status: new_user.row_status,
                };
                self.users.insert(id, user.clone());
                slot.insert(id);
                Ok(user)
            }
        }
    }

    async fn touch_pat_last_used(
        &self,
        user_id: i64,
        token_id: &str,
        used_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), StoreError> {
        for mut entry in self.pats.iter_mut() {
            if entry.user_id == user_id && entry.record.token_id == token_id {
                entry.record.last_used_at = Some(used_at);
                return Ok(());
            }
        }
        // Token deleted since the lookup; the update is advisory.
        Ok(())
    }
}
