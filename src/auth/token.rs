//! Signed session tokens
//!
//! HS256 JWTs carrying the username and an expiry. Tokens with a bad signature
//! or past their expiry are unauthorized; anything that does not parse as a
//! token is reported as invalid.

use crate::error::{ArenaError, Result};
use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Claims carried by a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    /// Expiry as seconds since the UNIX epoch
    pub exp: i64,
}

/// A freshly signed token
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires: DateTime<Utc>,
}

/// Issues and validates session tokens
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a token for `username` that expires after the configured lifetime
    pub fn issue(&self, username: &str) -> Result<IssuedToken> {
        let ttl = chrono::Duration::from_std(self.ttl).map_err(|e| {
            ArenaError::ConfigurationError {
                message: format!("token lifetime out of range: {}", e),
            }
        })?;
        let expires = Utc::now() + ttl;
        let claims = Claims {
            username: username.to_string(),
            exp: expires.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ArenaError::InternalError {
                message: format!("token could not be signed: {}", e),
            })?;

        debug!(username, expires = %expires, "Issued session token");
        Ok(IssuedToken { token, expires })
    }

    /// Check a token and return its claims
    pub fn validate(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        match decode::<Claims>(token, &self.decoding_key, &validation) {
            Ok(data) => Ok(data.claims),
            Err(e) => match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::ExpiredSignature => {
                    Err(ArenaError::Unauthorized {
                        reason: e.to_string(),
                    }
                    .into())
                }
                _ => Err(ArenaError::InvalidToken {
                    reason: e.to_string(),
                }
                .into()),
            },
        }
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
