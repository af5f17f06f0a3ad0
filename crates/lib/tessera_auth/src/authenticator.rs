//! Request authentication orchestration.
//!
//! One [`Authenticator`] serves a whole deployment: it is handed the store
//! and the signing secret once, then invoked concurrently, once per inbound
//! call. Credential kinds are tried in a fixed priority order — stateless
//! access token, then personal access token, then remote delegation — each
//! short-circuiting on success.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::models::{NewUser, PatRecord, RowStatus, User, UserClaims};
use crate::pat;
use crate::remote::RemoteIdentityClient;
use crate::store::CredentialStore;
use crate::token;

// =============================================================================
// Credential classification
// =============================================================================

/// A bearer credential, classified once by syntactic prefix.
///
/// PAT-shaped tokens are only ever matched by hash; everything else is a
/// signed token, eligible for the stateless and remote-delegated paths.
/// The kinds never cross.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// A signed (or remote-verifiable) bearer token.
    Signed(String),
    /// A personal access token, recognized by [`pat::PAT_PREFIX`].
    Pat(String),
}

impl Credential {
    /// Extract and classify the token from an `Authorization` header value.
    ///
    /// Anything that is not the exact `Bearer <token>` scheme — including a
    /// missing or empty token — is `None`: no credential, not an error.
    pub fn from_header(header: &str) -> Option<Credential> {
        let token = header.strip_prefix("Bearer ")?;
        if token.is_empty() {
            return None;
        }
        Some(if pat::is_pat(token) {
            Credential::Pat(token.to_string())
        } else {
            Credential::Signed(token.to_string())
        })
    }

    /// The raw bearer token.
    pub fn token(&self) -> &str {
        match self {
            Credential::Signed(token) | Credential::Pat(token) => token,
        }
    }
}

// =============================================================================
// Authentication results
// =============================================================================

/// The identity behind a successfully authenticated call.
///
/// The stateless access-token path yields [`Principal::Claims`] without a
/// store round trip; callers needing fresher fields than the claims carry
/// do their own lookup. The stateful paths yield the loaded record.
#[derive(Debug, Clone)]
pub enum Principal {
    /// Verified claims from an access token.
    Claims(UserClaims),
    /// Full user record (PAT and remote paths).
    User(User),
}

impl Principal {
    /// Numeric user ID of the principal.
    pub fn user_id(&self) -> i64 {
        match self {
            Principal::Claims(claims) => claims.user_id,
            Principal::User(user) => user.id,
        }
    }

    /// Username of the principal.
    pub fn username(&self) -> &str {
        match self {
            Principal::Claims(claims) => &claims.username,
            Principal::User(user) => &user.username,
        }
    }
}

/// Successful outcome of the combined authentication flow.
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub principal: Principal,
    /// The bearer token that authenticated, kept for caller-side auditing.
    pub bearer_token: String,
}

// =============================================================================
// PAT last-used updates
// =============================================================================

/// One queued last-used update.
struct TouchJob {
    user_id: i64,
    token_id: String,
    used_at: DateTime<Utc>,
}

/// Spawn the worker that drains last-used updates into the store.
///
/// Usage telemetry never affects an authentication outcome: failures feed
/// the log and nothing else. The worker exits once every sender is dropped.
fn spawn_last_used_worker(
    store: Arc<dyn CredentialStore>,
    queue_depth: usize,
) -> mpsc::Sender<TouchJob> {
    let (tx, mut rx) = mpsc::channel::<TouchJob>(queue_depth);
    tokio::spawn(async move {
        while let Some(job) = rx.recv().await {
            if let Err(e) = store
                .touch_pat_last_used(job.user_id, &job.token_id, job.used_at)
                .await
            {
                warn!(user_id = job.user_id, error = %e, "failed to record PAT last-used time");
            }
        }
    });
    tx
}

// =============================================================================
// Authenticator
// =============================================================================

/// Shared request authenticator.
///
/// Cheap to share behind an [`Arc`] and safe for concurrent use: calls
/// touch only the immutable secret, the store handle, and the update-queue
/// sender.
pub struct Authenticator {
    store: Arc<dyn CredentialStore>,
    secret: Vec<u8>,
    remote: Option<RemoteIdentityClient>,
    last_used_tx: mpsc::Sender<TouchJob>,
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("remote", &self.remote)
            .finish_non_exhaustive()
    }
}

impl Authenticator {
    /// Build an authenticator from its configuration.
    ///
    /// Configuration defects — an empty signing secret, an unusable identity
    /// endpoint — fail here, at startup, rather than surfacing per request.
    /// Must be called inside a Tokio runtime: the last-used worker task is
    /// spawned here.
    pub fn new(store: Arc<dyn CredentialStore>, config: AuthConfig) -> Result<Self, AuthError> {
        if config.secret.is_empty() {
            return Err(AuthError::Config("signing secret must not be empty".into()));
        }
        let remote = match &config.remote_identity_url {
            Some(url) => Some(RemoteIdentityClient::new(
                url.clone(),
                config.remote_timeout,
            )?),
            None => None,
        };
        let last_used_tx = spawn_last_used_worker(store.clone(), config.last_used_queue_depth);
        Ok(Self {
            store,
            secret: config.secret.into_bytes(),
            remote,
            last_used_tx,
        })
    }

    /// Authenticate one inbound call from its `Authorization` header value.
    ///
    /// Paths are tried in fixed priority order and short-circuit on
    /// success; every per-path rejection is soft. `None` means
    /// "unauthenticated", folding all rejection reasons together so the
    /// transport cannot leak which path failed; callers map it to their own
    /// protocol error. Per-path reasons still reach the log (`debug`, or
    /// `warn` for provider outages).
    pub async fn authenticate(&self, auth_header: &str) -> Option<AuthResult> {
        let credential = Credential::from_header(auth_header)?;

        match credential {
            Credential::Signed(ref bearer) => {
                match self.authenticate_by_access_token(bearer) {
                    Ok(claims) => {
                        return Some(AuthResult {
                            principal: Principal::Claims(claims),
                            bearer_token: bearer.clone(),
                        });
                    }
                    Err(e) => debug!(error = %e, "access token rejected"),
                }

                if self.remote.is_some() {
                    match self.authenticate_by_remote(auth_header).await {
                        Ok(user) => {
                            return Some(AuthResult {
                                principal: Principal::User(user),
                                bearer_token: bearer.clone(),
                            });
                        }
                        Err(e @ AuthError::RemoteUnavailable(_)) => {
                            warn!(error = %e, "remote identity path unavailable")
                        }
                        Err(e) => debug!(error = %e, "remote identity rejected"),
                    }
                }

                None
            }
            Credential::Pat(ref bearer) => match self.authenticate_by_pat(bearer).await {
                Ok((user, pat_record)) => {
                    self.schedule_last_used(user.id, &pat_record.token_id);
                    Some(AuthResult {
                        principal: Principal::User(user),
                        bearer_token: bearer.clone(),
                    })
                }
                Err(e) => {
                    debug!(error = %e, "personal access token rejected");
                    None
                }
            },
        }
    }

    /// Validate a short-lived access token.
    ///
    /// Stateless: signature, expiry, and claim shape are everything — no
    /// store lookup, which is what makes this the hot path. Claims carrying
    /// archived status are rejected outright; archival after issuance is
    /// invisible here, bounded by the 15-minute token lifetime.
    pub fn authenticate_by_access_token(
        &self,
        access_token: &str,
    ) -> Result<UserClaims, AuthError> {
        let claims = token::verify_access_token(access_token, &self.secret)?;
        let user_claims = claims.to_user_claims()?;
        if user_claims.status == RowStatus::Archived {
            return Err(AuthError::Archived);
        }
        Ok(user_claims)
    }

    /// Validate a refresh token against the store.
    ///
    /// A valid signature is not enough: the `(subject, jti)` record must
    /// still exist — its absence means [`AuthError::Revoked`] — and be
    /// unexpired, and the owner must exist and not be archived. Returns the
    /// user together with the token identifier so issuance endpoints can
    /// rotate the record.
    pub async fn authenticate_by_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<(User, String), AuthError> {
        let claims = token::verify_refresh_token(refresh_token, &self.secret)?;
        let user_id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| AuthError::Malformed(format!("non-numeric subject {:?}", claims.sub)))?;

        let record = self
            .store
            .refresh_token_by_id(user_id, &claims.jti)
            .await?
            .ok_or(AuthError::Revoked)?;
        if let Some(expires_at) = record.expires_at
            && expires_at < Utc::now()
        {
            return Err(AuthError::Expired);
        }

        let user = self
            .store
            .user_by_id(user_id)
            .await?
            .ok_or(AuthError::NotFound)?;
        if user.row_status == RowStatus::Archived {
            return Err(AuthError::Archived);
        }

        Ok((user, claims.jti))
    }

    /// Validate a personal access token by hash lookup.
    ///
    /// The raw secret is hashed immediately and never compared in the
    /// clear. Does not record usage: the combined flow schedules that
    /// separately, and direct callers decide for themselves.
    pub async fn authenticate_by_pat(&self, pat: &str) -> Result<(User, PatRecord), AuthError> {
        if !pat::is_pat(pat) {
            return Err(AuthError::Malformed(format!(
                "personal access tokens start with {:?}",
                pat::PAT_PREFIX
            )));
        }

        let token_hash = pat::hash(pat);
        let (user, record) = self
            .store
            .user_by_pat_hash(&token_hash)
            .await?
            .ok_or(AuthError::NotFound)?;

        if let Some(expires_at) = record.expires_at
            && expires_at < Utc::now()
        {
            return Err(AuthError::Expired);
        }
        if user.row_status == RowStatus::Archived {
            return Err(AuthError::Archived);
        }

        Ok((user, record))
    }

    /// Resolve the caller through the remote identity provider, provisioning
    /// a shadow account on first sight.
    ///
    /// The provider is trusted completely for identity; the only local
    /// verification is the archived check. Concurrent first sights of the
    /// same username race on creation — the loser surfaces
    /// [`AuthError::Conflict`], which is retryable.
    pub async fn authenticate_by_remote(&self, auth_header: &str) -> Result<User, AuthError> {
        let Some(remote) = &self.remote else {
            return Err(AuthError::Config(
                "no remote identity endpoint configured".into(),
            ));
        };

        let identity = remote.fetch(auth_header).await?;

        if let Some(user) = self.store.user_by_username(&identity.username).await? {
            if user.row_status == RowStatus::Archived {
                return Err(AuthError::Archived);
            }
            return Ok(user);
        }

        let user = self
            .store
            .create_user(NewUser::shadow(&identity.username))
            .await?;
        debug!(user_id = user.id, username = %user.username, "provisioned shadow account");
        Ok(user)
    }

    /// Queue a best-effort PAT last-used update.
    ///
    /// Never blocks and never fails the authenticated call: when the queue
    /// is full the update is dropped with a warning.
    fn schedule_last_used(&self, user_id: i64, token_id: &str) {
        let job = TouchJob {
            user_id,
            token_id: token_id.to_string(),
            used_at: Utc::now(),
        };
        if self.last_used_tx.try_send(job).is_err() {
            warn!(user_id, token_id, "last-used queue full, dropping update");
        }
    }
}
