//! Authentication and authorization for Storyhouse
//!
//! Provides:
//! - JWT token generation and validation
//! - Password hashing with Argon2
//! - Actor resolution from inbound request headers

pub mod jwt;
pub mod password;

pub use jwt::{extract_token_from_header, Claims, TokenIssuer};
pub use password::{hash_password, verify_password};

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;

use crate::error::ApiError;

/// Resolve the acting user id from a request's Authorization header.
///
/// Fails with `Unauthenticated` when the token is absent, malformed or
/// expired. Ownership checks against the resolved id happen at the
/// individual operations.
pub fn resolve_actor(tokens: &TokenIssuer, headers: &HeaderMap) -> Result<i64, ApiError> {
    let header = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());

    let token = extract_token_from_header(header)
        .ok_or_else(|| ApiError::Unauthenticated("no token provided".to_string()))?;

    tokens.verify(token)
}

/// Resolve the acting user id if a valid token is present, or `None` for
/// anonymous requests. Used by endpoints that are public but record
/// per-user engagement when an identity is available.
pub fn resolve_actor_opt(tokens: &TokenIssuer, headers: &HeaderMap) -> Option<i64> {
    resolve_actor(tokens, headers).ok()
}
