//! Personal access tokens.
//!
//! Long-lived opaque bearer secrets for scripts and CI, recognizable by the
//! `pat_` prefix. The server stores only the SHA-256 hash of the full token
//! string; the secret itself is shown once at mint time and never kept or
//! compared in the clear.

use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Prefix marking a bearer token as a personal access token.
pub const PAT_PREFIX: &str = "pat_";

/// Random secret length after the prefix (40 alphanumeric chars).
const PAT_SECRET_LEN: usize = 40;

/// Whether a bearer token is a personal access token, by syntactic prefix.
pub fn is_pat(token: &str) -> bool {
    token.starts_with(PAT_PREFIX)
}

/// Mint a new personal access token. Returns `(token_id, plaintext)`.
///
/// Only [`hash`] of the plaintext may be persisted.
pub fn generate() -> (String, String) {
    let secret: String = rng()
        .sample_iter(&Alphanumeric)
        .take(PAT_SECRET_LEN)
        .map(char::from)
        .collect();
    (Uuid::new_v4().to_string(), format!("{PAT_PREFIX}{secret}"))
}

/// SHA-256 hash of the full token string, hex-encoded.
pub fn hash(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
