//! Remote identity provider client.
//!
//! Delegated authentication for bearer tokens this service did not issue:
//! the caller's `Authorization` header is forwarded verbatim to a
//! third-party identity endpoint, which answers with the identity behind
//! the token. One bounded-timeout attempt per call; retries belong to the
//! provider's clients, not here.

use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use serde::Deserialize;

use crate::error::AuthError;

/// Default bound on a single identity call.
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(2);

/// Identity answered by the provider.
///
/// Never persisted as-is; `username` is the join key to local users.
/// Decoding is lenient — providers may omit fields — and the authenticator
/// decides what an unusable identity means.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteIdentity {
    /// Provider-side identifier, informational only.
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub username: String,
}

/// HTTP client for the identity endpoint.
#[derive(Debug, Clone)]
pub struct RemoteIdentityClient {
    client: reqwest::Client,
    endpoint: String,
}

impl RemoteIdentityClient {
    /// Build a client for `endpoint` with a per-call `timeout`.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::Config(format!("Failed to build identity client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// The identity endpoint this client calls.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Resolve the identity behind `authorization` (the original header
    /// value, forwarded verbatim).
    ///
    /// Connection failures, timeouts, and non-success statuses are
    /// [`AuthError::RemoteUnavailable`]; an answer that decodes to no
    /// usable username is [`AuthError::RemoteInvalidIdentity`].
    pub async fn fetch(&self, authorization: &str) -> Result<RemoteIdentity, AuthError> {
        let resp = self
            .client
            .get(&self.endpoint)
            .header(AUTHORIZATION, authorization)
            .send()
            .await
            .map_err(|e| AuthError::RemoteUnavailable(format!("Identity request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AuthError::RemoteUnavailable(format!(
                "Identity endpoint answered {}",
                resp.status()
            )));
        }

        let identity: RemoteIdentity = resp
            .json()
            .await
            .map_err(|_| AuthError::RemoteInvalidIdentity)?;

        if identity.username.is_empty() {
            return Err(AuthError::RemoteInvalidIdentity);
        }

        Ok(identity)
    }
}
