//! JWT token generation and validation
//!
//! Tokens carry the acting user's id as the subject claim and an expiry.
//! No other claims are defined.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Claims embedded in an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id, as a string
    pub sub: String,
    /// Expiry as a unix timestamp
    pub exp: u64,
}

/// Issues and verifies HS256 access tokens
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiry_seconds: u64,
}

impl TokenIssuer {
    pub fn new(secret: &str, expiry_seconds: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            expiry_seconds,
        }
    }

    /// Issue a token for the given user id
    pub fn issue(&self, user_id: i64) -> Result<String, ApiError> {
        let claims = Claims {
            sub: user_id.to_string(),
            exp: Utc::now().timestamp() as u64 + self.expiry_seconds,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| ApiError::Internal(format!("Failed to sign token: {e}")))
    }

    /// Verify a token and return the user id it identifies.
    ///
    /// Malformed, tampered and expired tokens all fail with `Unauthenticated`.
    pub fn verify(&self, token: &str) -> Result<i64, ApiError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())?;

        data.claims
            .sub
            .parse::<i64>()
            .map_err(|_| ApiError::Unauthenticated("invalid token subject".to_string()))
    }
}

/// Extract a bearer token from an Authorization header value
pub fn extract_token_from_header(header: Option<&str>) -> Option<&str> {
    header.and_then(|value| value.strip_prefix("Bearer "))
}
