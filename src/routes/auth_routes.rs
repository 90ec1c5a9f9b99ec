//! HTTP routes for identity
//!
//! - POST /check-username - advisory availability check
//! - POST /register       - create credentials
//! - POST /login          - authenticate and get a bearer token

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::{hash_password, verify_password};
use crate::db::users;
use crate::error::ApiError;
use crate::server::SharedState;

#[derive(Debug, Deserialize)]
pub struct CheckUsernameRequest {
    pub username: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckUsernameResponse {
    pub exists: bool,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub age: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub name: String,
    pub age: i64,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// POST /check-username
///
/// Availability pre-check only; registration itself is protected by the
/// unique constraint, so a stale answer here cannot corrupt anything.
pub async fn check_username(
    State(state): State<SharedState>,
    Json(body): Json<CheckUsernameRequest>,
) -> Result<(StatusCode, Json<CheckUsernameResponse>), ApiError> {
    let username = require_field(body.username, "username")?;

    let exists = state
        .db
        .with_conn(|conn| users::username_exists(conn, &username))?;

    if exists {
        Ok((
            StatusCode::BAD_REQUEST,
            Json(CheckUsernameResponse {
                exists: true,
                message: "this username is already taken".to_string(),
            }),
        ))
    } else {
        Ok((
            StatusCode::OK,
            Json(CheckUsernameResponse {
                exists: false,
                message: "this username is available".to_string(),
            }),
        ))
    }
}

/// POST /register
///
/// Flow:
/// 1. Validate required fields
/// 2. Hash password with argon2
/// 3. Insert; a duplicate username surfaces as Conflict from the unique
///    constraint even when two registrations race past the pre-check
pub async fn register(
    State(state): State<SharedState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let username = require_field(body.username, "username")?;
    let password = require_field(body.password, "password")?;
    let name = require_field(body.name, "name")?;
    let age = body
        .age
        .ok_or_else(|| ApiError::Validation("name and age are required".to_string()))?;

    let password_hash = hash_password(&password)?;

    state
        .db
        .with_conn(|conn| users::create_user(conn, &username, &password_hash, &name, age))?;

    info!("Registered new user: {}", username);

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "registration successful".to_string(),
        }),
    ))
}

/// POST /login
///
/// Unknown username and wrong password both produce the same generic 401,
/// so responses cannot be used to enumerate usernames.
pub async fn login(
    State(state): State<SharedState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let username = require_field(body.username, "username")?;
    let password = require_field(body.password, "password")?;

    let user = state
        .db
        .with_conn(|conn| users::find_by_username(conn, &username))?;

    let user = match user {
        Some(u) => u,
        None => {
            warn!("Login failed - user not found: {}", username);
            return Err(invalid_credentials());
        }
    };

    if !verify_password(&password, &user.password_hash)? {
        warn!("Login failed - invalid password: {}", username);
        return Err(invalid_credentials());
    }

    let token = state.tokens.issue(user.id)?;

    info!("Login successful: {}", username);

    Ok(Json(LoginResponse {
        token,
        name: user.name,
        age: user.age,
    }))
}

fn invalid_credentials() -> ApiError {
    ApiError::Unauthenticated("invalid username or password".to_string())
}

fn require_field(value: Option<String>, field: &str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::Validation(format!("{field} is required"))),
    }
}
