//! Authenticator configuration.

use std::time::Duration;

use crate::remote::DEFAULT_REMOTE_TIMEOUT;

/// Default capacity of the PAT last-used update queue.
pub const DEFAULT_LAST_USED_QUEUE_DEPTH: usize = 64;

/// Configuration for [`crate::Authenticator`].
///
/// The signing secret is injected here explicitly — never read from global
/// state inside the library — so deployments can rotate keys per instance
/// and tests can run with distinct secrets side by side.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Shared HS256 signing secret. Must be non-empty.
    pub secret: String,
    /// Identity endpoint for the remote delegated path; `None` disables
    /// that path entirely.
    pub remote_identity_url: Option<String>,
    /// Bound on a single remote identity call.
    pub remote_timeout: Duration,
    /// Capacity of the PAT last-used update queue.
    pub last_used_queue_depth: usize,
}

impl AuthConfig {
    /// Configuration with the given secret and everything else defaulted.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            remote_identity_url: None,
            remote_timeout: DEFAULT_REMOTE_TIMEOUT,
            last_used_queue_depth: DEFAULT_LAST_USED_QUEUE_DEPTH,
        }
    }

    /// Enable the remote delegated path against `url`.
    pub fn with_remote_identity(mut self, url: impl Into<String>) -> Self {
        self.remote_identity_url = Some(url.into());
        self
    }

    /// Reads configuration from environment variables.
    ///
    /// | Variable                        | Default                          |
    /// |---------------------------------|----------------------------------|
    /// | `TESSERA_AUTH_SECRET`           | empty (rejected at construction) |
    /// | `TESSERA_IDENTITY_URL`          | unset — remote path disabled     |
    /// | `TESSERA_IDENTITY_TIMEOUT_SECS` | `2`                              |
    pub fn from_env() -> Self {
        let mut config = Self::new(std::env::var("TESSERA_AUTH_SECRET").unwrap_or_default());
        if let Ok(url) = std::env::var("TESSERA_IDENTITY_URL")
            && !url.is_empty()
        {
            config.remote_identity_url = Some(url);
        }
        if let Ok(secs) = std::env::var("TESSERA_IDENTITY_TIMEOUT_SECS")
            && let Ok(secs) = secs.parse::<u64>()
        {
            config.remote_timeout = Duration::from_secs(secs);
        }
        config
    }
}
