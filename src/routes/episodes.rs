//! HTTP route for appending episodes
//!
//! - POST /api/episode - append an installment to a work

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::db::episodes;
use crate::error::ApiError;
use crate::server::SharedState;

#[derive(Debug, Deserialize)]
pub struct AddEpisodeRequest {
    #[serde(rename = "workId")]
    pub work_id: Option<i64>,
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AddEpisodeResponse {
    pub message: String,
    #[serde(rename = "episodeNumber")]
    pub episode_number: i64,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

/// POST /api/episode
pub async fn add_episode(
    State(state): State<SharedState>,
    Json(body): Json<AddEpisodeRequest>,
) -> Result<(StatusCode, Json<AddEpisodeResponse>), ApiError> {
    let work_id = body
        .work_id
        .ok_or_else(|| ApiError::Validation("workId and content are required".to_string()))?;
    let content = match body.content {
        Some(c) if !c.is_empty() => c,
        _ => {
            return Err(ApiError::Validation(
                "workId and content are required".to_string(),
            ))
        }
    };

    let (episode_number, created_at) = state
        .db
        .with_conn_mut(|conn| episodes::add_episode(conn, work_id, &content))?;

    info!(work = work_id, number = episode_number, "Episode added");

    Ok((
        StatusCode::CREATED,
        Json(AddEpisodeResponse {
            message: "episode added".to_string(),
            episode_number,
            created_at,
        }),
    ))
}
