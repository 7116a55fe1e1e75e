use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::errors::ErrorCode;
use crate::state::security_config::SecurityConfig;
use crate::AppError;

/// Claims carried by actor tokens.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Stable actor identifier (e.g. chat user id)
    pub sub: String,
    /// Display name for logs
    pub name: String,
    /// Role names; team handles and the referee role live here
    #[serde(default)]
    pub roles: Vec<String>,
    /// Issued-at (seconds since epoch)
    pub iat: i64,
    /// Expiry (seconds since epoch)
    pub exp: i64,
}

/// Mint a HS256 access token valid for `ttl`.
pub fn mint_access_token(
    sub: &str,
    name: &str,
    roles: &[String],
    now: SystemTime,
    ttl: Duration,
    security: &SecurityConfig,
) -> Result<String, AppError> {
    let iat = now
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::internal(ErrorCode::InternalError, "Clock is before epoch", e))?
        .as_secs() as i64;

    let claims = Claims {
        sub: sub.to_string(),
        name: name.to_string(),
        roles: roles.to_vec(),
        iat,
        exp: iat + ttl.as_secs() as i64,
    };

    encode(
        &Header::new(security.algorithm),
        &claims,
        &EncodingKey::from_secret(&security.jwt_secret),
    )
    .map_err(|e| AppError::internal(ErrorCode::InternalError, "Failed to encode JWT", e))
}

/// Verify a token and return its claims.
///
/// Expired tokens map to `UNAUTHORIZED_EXPIRED_JWT`, every other decode
/// failure to `UNAUTHORIZED_INVALID_JWT`.
pub fn verify_access_token(token: &str, security: &SecurityConfig) -> Result<Claims, AppError> {
    // Default Validation already checks exp; pin algorithm to configured algorithm.
    let validation = Validation::new(security.algorithm);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(&security.jwt_secret),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            AppError::unauthorized(ErrorCode::UnauthorizedExpiredJwt)
        }
        _ => AppError::unauthorized(ErrorCode::UnauthorizedInvalidJwt),
    })
}
