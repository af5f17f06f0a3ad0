//! Signed token generation and verification.
//!
//! Access and refresh tokens are stateless HS256 JWTs sharing one signing
//! secret. The two claim shapes are deliberately disjoint and pinned to
//! kind-specific audiences, so a token of one kind can never verify as the
//! other.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::models::{Role, RowStatus, User, UserClaims};

/// Access token lifetime: 15 minutes.
pub const ACCESS_TOKEN_EXPIRY_SECS: i64 = 15 * 60;

/// Refresh token lifetime: 30 days.
pub const REFRESH_TOKEN_EXPIRY_DAYS: i64 = 30;

/// Audience pinned into access tokens.
pub const ACCESS_TOKEN_AUDIENCE: &str = "tessera.access-token";

/// Audience pinned into refresh tokens.
pub const REFRESH_TOKEN_AUDIENCE: &str = "tessera.refresh-token";

/// Claims embedded in access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject — user ID as a decimal string (standard JWT `sub` claim).
    pub sub: String,
    pub username: String,
    pub role: Role,
    pub status: RowStatus,
    /// Audience — always [`ACCESS_TOKEN_AUDIENCE`].
    pub aud: String,
    /// Expiry (unix timestamp).
    pub exp: i64,
    /// Issued at (unix timestamp).
    pub iat: i64,
}

impl AccessTokenClaims {
    /// Claims for `user`, issued now with the fixed 15-minute lifetime.
    pub fn new(user: &User) -> Self {
        let now = Utc::now();
        Self {
            sub: user.id.to_string(),
            username: user.username.clone(),
            role: user.role,
            status: user.row_status,
            aud: ACCESS_TOKEN_AUDIENCE.to_string(),
            exp: (now + Duration::seconds(ACCESS_TOKEN_EXPIRY_SECS)).timestamp(),
            iat: now.timestamp(),
        }
    }

    /// Convert verified claims into a principal. A non-numeric subject is
    /// malformed.
    pub fn to_user_claims(&self) -> Result<UserClaims, AuthError> {
        let user_id = self
            .sub
            .parse::<i64>()
            .map_err(|_| AuthError::Malformed(format!("non-numeric subject {:?}", self.sub)))?;
        Ok(UserClaims {
            user_id,
            username: self.username.clone(),
            role: self.role,
            status: self.status,
        })
    }
}

/// Claims embedded in refresh tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenClaims {
    /// Subject — user ID as a decimal string.
    pub sub: String,
    /// Token identifier; must match a stored refresh token record.
    pub jti: String,
    /// Audience — always [`REFRESH_TOKEN_AUDIENCE`].
    pub aud: String,
    /// Expiry (unix timestamp).
    pub exp: i64,
    /// Issued at (unix timestamp).
    pub iat: i64,
}

impl RefreshTokenClaims {
    /// Claims for `user_id` under `token_id`, issued now with the fixed
    /// 30-day lifetime.
    pub fn new(user_id: i64, token_id: &str) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id.to_string(),
            jti: token_id.to_string(),
            aud: REFRESH_TOKEN_AUDIENCE.to_string(),
            exp: (now + Duration::days(REFRESH_TOKEN_EXPIRY_DAYS)).timestamp(),
            iat: now.timestamp(),
        }
    }
}

/// Sign access token claims (HS256).
pub fn sign_access_token(claims: &AccessTokenClaims, secret: &[u8]) -> Result<String, AuthError> {
    encode(&Header::default(), claims, &EncodingKey::from_secret(secret))
        .map_err(|e| AuthError::Config(format!("jwt encode: {e}")))
}

/// Sign refresh token claims (HS256).
pub fn sign_refresh_token(claims: &RefreshTokenClaims, secret: &[u8]) -> Result<String, AuthError> {
    encode(&Header::default(), claims, &EncodingKey::from_secret(secret))
        .map_err(|e| AuthError::Config(format!("jwt encode: {e}")))
}

/// Generate a signed access token for `user`.
pub fn issue_access_token(user: &User, secret: &[u8]) -> Result<String, AuthError> {
    sign_access_token(&AccessTokenClaims::new(user), secret)
}

/// Generate a signed refresh token for `user_id` under `token_id`.
///
/// The caller is expected to persist a matching [`RefreshTokenRecord`]; a
/// refresh token without one is revoked from the start.
///
/// [`RefreshTokenRecord`]: crate::models::RefreshTokenRecord
pub fn issue_refresh_token(
    user_id: i64,
    token_id: &str,
    secret: &[u8],
) -> Result<String, AuthError> {
    sign_refresh_token(&RefreshTokenClaims::new(user_id, token_id), secret)
}

/// Verify an access token, returning the claims on success.
///
/// Expiry is exact (no leeway). A refresh token fed here fails as
/// [`AuthError::Malformed`] on its audience before anything else is
/// considered.
pub fn verify_access_token(token: &str, secret: &[u8]) -> Result<AccessTokenClaims, AuthError> {
    let data = decode::<AccessTokenClaims>(
        token,
        &DecodingKey::from_secret(secret),
        &validation_for(ACCESS_TOKEN_AUDIENCE),
    )
    .map_err(map_jwt_error)?;
    Ok(data.claims)
}

/// Verify a refresh token, returning the claims on success.
///
/// Only the signature and claim shape are checked here; the revocation
/// lookup belongs to [`crate::Authenticator::authenticate_by_refresh_token`].
pub fn verify_refresh_token(token: &str, secret: &[u8]) -> Result<RefreshTokenClaims, AuthError> {
    let data = decode::<RefreshTokenClaims>(
        token,
        &DecodingKey::from_secret(secret),
        &validation_for(REFRESH_TOKEN_AUDIENCE),
    )
    .map_err(map_jwt_error)?;
    Ok(data.claims)
}

fn validation_for(audience: &str) -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[audience]);
    validation.validate_exp = true;
    validation.leeway = 0;
    validation
}

fn map_jwt_error(e: jsonwebtoken::errors::Error) -> AuthError {
    match e.kind() {
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        ErrorKind::ExpiredSignature => AuthError::Expired,
        _ => AuthError::Malformed(format!("jwt decode: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-signing-secret";

    fn sample_user() -> User {
        User {
            id: 42,
            username: "ada".into(),
            nickname: "Ada".into(),
            email: "ada@example.com".into(),
            password_hash: "$hash$".into(),
            role: Role::Admin,
            row_status: RowStatus::Normal,
        }
    }

    #[test]
    fn access_token_round_trip_preserves_claims() {
        let user = sample_user();
        let token = issue_access_token(&user, SECRET).unwrap();
        let claims = verify_access_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.username, "ada");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.status, RowStatus::Normal);
        assert_eq!(claims.aud, ACCESS_TOKEN_AUDIENCE);
        assert_eq!(claims.exp - claims.iat, ACCESS_TOKEN_EXPIRY_SECS);
        assert_eq!(claims.to_user_claims().unwrap().user_id, 42);
    }

    #[test]
    fn access_token_within_lifetime_verifies() {
        // Signed five minutes ago with the 15-minute lifetime.
        let mut claims = AccessTokenClaims::new(&sample_user());
        let now = Utc::now();
        claims.iat = (now - Duration::seconds(300)).timestamp();
        claims.exp = claims.iat + ACCESS_TOKEN_EXPIRY_SECS;
        let token = sign_access_token(&claims, SECRET).unwrap();
        assert!(verify_access_token(&token, SECRET).is_ok());
    }

    #[test]
    fn expired_access_token_is_rejected() {
        let mut claims = AccessTokenClaims::new(&sample_user());
        claims.exp = (Utc::now() - Duration::seconds(60)).timestamp();
        let token = sign_access_token(&claims, SECRET).unwrap();
        assert!(matches!(
            verify_access_token(&token, SECRET),
            Err(AuthError::Expired)
        ));
    }

    #[test]
    fn wrong_secret_is_invalid_signature() {
        let token = issue_access_token(&sample_user(), SECRET).unwrap();
        assert!(matches!(
            verify_access_token(&token, b"other-secret"),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn garbage_token_is_malformed() {
        assert!(matches!(
            verify_access_token("not-a-jwt", SECRET),
            Err(AuthError::Malformed(_))
        ));
    }

    #[test]
    fn refresh_token_round_trip_preserves_claims() {
        let token = issue_refresh_token(42, "tok-1", SECRET).unwrap();
        let claims = verify_refresh_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.jti, "tok-1");
        assert_eq!(claims.aud, REFRESH_TOKEN_AUDIENCE);
        assert_eq!(
            claims.exp - claims.iat,
            REFRESH_TOKEN_EXPIRY_DAYS * 24 * 60 * 60
        );
    }

    #[test]
    fn refresh_token_does_not_verify_as_access_token() {
        let refresh = issue_refresh_token(42, "tok-1", SECRET).unwrap();
        assert!(matches!(
            verify_access_token(&refresh, SECRET),
            Err(AuthError::Malformed(_))
        ));
    }

    #[test]
    fn access_token_does_not_verify_as_refresh_token() {
        let access = issue_access_token(&sample_user(), SECRET).unwrap();
        assert!(matches!(
            verify_refresh_token(&access, SECRET),
            Err(AuthError::Malformed(_))
        ));
    }

    #[test]
    fn non_numeric_subject_is_malformed() {
        let mut claims = AccessTokenClaims::new(&sample_user());
        claims.sub = "not-a-number".into();
        assert!(matches!(
            claims.to_user_claims(),
            Err(AuthError::Malformed(_))
        ));
    }
}
