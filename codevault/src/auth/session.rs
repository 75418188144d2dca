//! JWT session token creation and verification.

use chrono::{DateTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use serde::{Deserialize, Serialize};

use crate::{api::models::users::CurrentUser, config::Config, errors::Error, types::UserId};

/// JWT session claims
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,      // Subject (user ID, as a string)
    pub username: String, // Username
    pub exp: i64,         // Expiration time
    pub iat: i64,         // Issued at
}

impl SessionClaims {
    /// Create new session claims for a user
    pub fn new(user_id: UserId, username: &str, config: &Config) -> Self {
        let now = Utc::now();
        let exp = now + config.auth.jwt.expiry();

        Self {
            sub: user_id.to_string(),
            username: username.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        }
    }
}

impl TryFrom<SessionClaims> for CurrentUser {
    type Error = Error;

    fn try_from(claims: SessionClaims) -> Result<Self, Error> {
        let id = claims.sub.parse::<UserId>().map_err(|_| Error::Unauthenticated { message: None })?;
        Ok(Self {
            id,
            username: claims.username,
        })
    }
}

fn secret(config: &Config) -> Result<&[u8], Error> {
    config
        .auth
        .jwt
        .secret
        .as_deref()
        .map(str::as_bytes)
        .ok_or_else(|| Error::Internal {
            operation: "JWT sessions: secret is required".to_string(),
        })
}

/// Create a JWT token for a user session, returning it with its expiry.
pub fn create_session_token(user_id: UserId, username: &str, config: &Config) -> Result<(String, DateTime<Utc>), Error> {
    let claims = SessionClaims::new(user_id, username, config);
    let expires_at = DateTime::from_timestamp(claims.exp, 0).ok_or_else(|| Error::Internal {
        operation: format!("compute token expiry from {}", claims.exp),
    })?;

    let key = EncodingKey::from_secret(secret(config)?);
    let token = encode(&Header::default(), &claims, &key).map_err(|e| Error::Internal {
        operation: format!("create JWT: {e}"),
    })?;

    Ok((token, expires_at))
}

/// Verify and decode a JWT session token
pub fn verify_session_token(token: &str, config: &Config) -> Result<CurrentUser, Error> {
    let key = DecodingKey::from_secret(secret(config)?);
    let validation = Validation::default();

    let token_data = decode::<SessionClaims>(token, &key, &validation).map_err(|e| match e.kind() {
        // Client errors (401) - malformed tokens, invalid or missing claims, expired tokens
        ErrorKind::InvalidToken
        | ErrorKind::InvalidSignature
        | ErrorKind::ExpiredSignature
        | ErrorKind::MissingRequiredClaim(_)
        | ErrorKind::InvalidIssuer
        | ErrorKind::InvalidAudience
        | ErrorKind::InvalidSubject
        | ErrorKind::ImmatureSignature
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_)
        | ErrorKind::InvalidAlgorithm => Error::Unauthenticated { message: None },

        // Server errors (500) - key issues, internal failures
        ErrorKind::InvalidEcdsaKey
        | ErrorKind::InvalidRsaKey(_)
        | ErrorKind::RsaFailedSigning
        | ErrorKind::InvalidAlgorithmName
        | ErrorKind::InvalidKeyFormat
        | ErrorKind::MissingAlgorithm
        | ErrorKind::Crypto(_) => Error::Internal {
            operation: format!("JWT verification: {e}"),
        },

        _ => Error::Internal {
            operation: format!("JWT verification (unknown error): {e}"),
        },
    })?;

    CurrentUser::try_from(token_data.claims)
}
