//! HTTP routes for the acting user
//!
//! - PATCH /users/me - partial profile update
//! - GET   /users/me - dashboard composite

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

use crate::auth::resolve_actor;
use crate::db::{dashboard, users};
use crate::error::ApiError;
use crate::routes::auth_routes::MessageResponse;
use crate::server::SharedState;
use crate::views::DashboardView;

/// Partial update body. Absent fields are left untouched; empty strings are
/// treated as absent; age applies whenever present, zero included.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub name: Option<String>,
    pub age: Option<i64>,
    pub nickname: Option<String>,
    pub profile_image: Option<String>,
}

/// PATCH /users/me
pub async fn update_profile(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let actor = resolve_actor(&state.tokens, &headers)?;

    let changes = users::ProfileChanges {
        username: body.username,
        name: body.name,
        age: body.age,
        nickname: body.nickname,
        profile_image: body.profile_image,
    };

    state.db.with_conn(|conn| {
        users::find_by_id(conn, actor)?
            .ok_or_else(|| ApiError::NotFound("user not found".to_string()))?;
        users::update_profile(conn, actor, &changes)
    })?;

    Ok(Json(MessageResponse {
        message: "profile updated".to_string(),
    }))
}

/// GET /users/me
///
/// Four independent reads composed into one response; if any of them fails
/// the whole call fails.
pub async fn get_dashboard(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<DashboardView>, ApiError> {
    let actor = resolve_actor(&state.tokens, &headers)?;

    let view = state.db.with_conn(|conn| {
        let profile = dashboard::profile(conn, actor)?
            .ok_or_else(|| ApiError::NotFound("user not found".to_string()))?;

        Ok(DashboardView {
            profile,
            recent_views: dashboard::recent_views(conn, actor)?,
            my_works: dashboard::authored_works(conn, actor)?,
            liked_works: dashboard::liked_works(conn, actor)?,
        })
    })?;

    Ok(Json(view))
}
