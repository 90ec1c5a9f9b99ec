//! HTTP routes for works
//!
//! - GET    /notes               - list all works
//! - POST   /notes               - create a work (bearer)
//! - GET    /notes/{id}          - detail view; bumps the view counter
//! - PUT    /notes/{id}          - wholesale update (bearer, owner only)
//! - DELETE /notes/{id}          - delete (bearer, owner only)
//! - POST   /notes/{id}/like     - like (bearer)
//! - GET    /best9               - top nine works by likes
//! - GET    /author/{name}/works - an author's public listing

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{resolve_actor, resolve_actor_opt};
use crate::db::{comments, engagement, episodes, users, works};
use crate::error::ApiError;
use crate::routes::auth_routes::MessageResponse;
use crate::server::SharedState;
use crate::views::{AuthorWorkItem, AuthorWorksView, CommentView, EpisodeView, WorkDetailView};

/// Body for create and update; creation fills absent fields with empty
/// strings, update replaces all five wholesale.
#[derive(Debug, Default, Deserialize)]
pub struct WorkBody {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub description: String,
}

impl WorkBody {
    fn into_fields(self) -> works::WorkFields {
        works::WorkFields {
            title: self.title,
            content: self.content,
            category: self.category,
            image: self.image,
            description: self.description,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WorkCreatedResponse {
    pub id: i64,
    pub message: String,
}

/// GET /notes
pub async fn list_works(
    State(state): State<SharedState>,
) -> Result<Json<Vec<works::WorkRow>>, ApiError> {
    let all = state.db.with_conn(works::list_works)?;
    Ok(Json(all))
}

/// POST /notes
///
/// The author's display name is denormalized onto the work at creation,
/// from the acting user's stored name.
pub async fn create_work(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<WorkBody>,
) -> Result<(StatusCode, Json<WorkCreatedResponse>), ApiError> {
    let actor = resolve_actor(&state.tokens, &headers)?;
    let fields = body.into_fields();

    let id = state.db.with_conn(|conn| {
        let author = users::find_by_id(conn, actor)?
            .ok_or_else(|| ApiError::NotFound("user not found".to_string()))?;
        works::create_work(conn, actor, &author.name, &fields)
    })?;

    info!(work = id, author = actor, "Work created");

    Ok((
        StatusCode::CREATED,
        Json(WorkCreatedResponse {
            id,
            message: "work created".to_string(),
        }),
    ))
}

/// PUT /notes/{id}
pub async fn update_work(
    State(state): State<SharedState>,
    Path(work_id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<WorkBody>,
) -> Result<Json<MessageResponse>, ApiError> {
    let actor = resolve_actor(&state.tokens, &headers)?;
    let fields = body.into_fields();

    state
        .db
        .with_conn(|conn| works::update_work(conn, work_id, actor, &fields))?;

    Ok(Json(MessageResponse {
        message: "work updated".to_string(),
    }))
}

/// DELETE /notes/{id}
pub async fn delete_work(
    State(state): State<SharedState>,
    Path(work_id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, ApiError> {
    let actor = resolve_actor(&state.tokens, &headers)?;

    state
        .db
        .with_conn(|conn| works::delete_work(conn, work_id, actor))?;

    info!(work = work_id, actor = actor, "Work deleted");

    Ok(Json(MessageResponse {
        message: "work deleted".to_string(),
    }))
}

/// POST /notes/{id}/like
///
/// Always bumps the counter; additionally records membership so the
/// dashboard can list the actor's liked works.
pub async fn like_work(
    State(state): State<SharedState>,
    Path(work_id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, ApiError> {
    let actor = resolve_actor(&state.tokens, &headers)?;

    state.db.with_conn(|conn| {
        works::get_work(conn, work_id)?
            .ok_or_else(|| ApiError::NotFound("work not found".to_string()))?;
        engagement::increment_likes(conn, work_id)?;
        engagement::record_like(conn, actor, work_id)
    })?;

    Ok(Json(MessageResponse {
        message: "like added".to_string(),
    }))
}

/// GET /best9
pub async fn best9(State(state): State<SharedState>) -> Result<Json<Vec<works::WorkRow>>, ApiError> {
    let top = state.db.with_conn(|conn| works::list_top(conn, 9))?;
    Ok(Json(top))
}

/// GET /notes/{id}
///
/// Increments the view counter before the fetch, so the returned count
/// already reflects this read. When the request carries a valid token, the
/// view is also recorded for the actor's recent-views list.
pub async fn work_detail(
    State(state): State<SharedState>,
    Path(work_id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<WorkDetailView>, ApiError> {
    let viewer = resolve_actor_opt(&state.tokens, &headers);

    let detail = state.db.with_conn(|conn| {
        engagement::increment_views(conn, work_id)?;

        let work = works::get_work(conn, work_id)?
            .ok_or_else(|| ApiError::NotFound("work not found".to_string()))?;

        if let Some(user_id) = viewer {
            engagement::record_view(conn, user_id, work_id)?;
        }

        let mut episode_views = vec![];
        for episode in episodes::list_for_work(conn, work_id)? {
            let comments = comments::list_for_episode(conn, episode.id)?
                .into_iter()
                .map(CommentView::from)
                .collect();
            episode_views.push(EpisodeView::new(episode, comments));
        }

        Ok(WorkDetailView {
            work,
            episodes: episode_views,
        })
    })?;

    Ok(Json(detail))
}

/// GET /author/{name}/works
pub async fn works_by_author(
    State(state): State<SharedState>,
    Path(author_name): Path<String>,
) -> Result<Json<AuthorWorksView>, ApiError> {
    let view = state.db.with_conn(|conn| {
        let author = users::find_by_name(conn, &author_name)?
            .ok_or_else(|| ApiError::NotFound("author not found".to_string()))?;

        let works = works::list_by_author(conn, author.id)?
            .into_iter()
            .map(AuthorWorkItem::from)
            .collect();

        Ok(AuthorWorksView {
            author_name: author.name,
            works,
        })
    })?;

    Ok(Json(view))
}
