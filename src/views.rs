//! View types for the HTTP API boundary
//!
//! Aggregated responses assembled from multiple single-entity queries.
//! Field names follow the platform's wire format, which mixes snake_case
//! row fields with camelCase keys on nested collections; the renames here
//! are deliberate and pinned by the integration tests.

use serde::Serialize;

use crate::db::comments::CommentWithAuthor;
use crate::db::dashboard::{AuthoredWork, ProfileInfo, WorkWithAuthor};
use crate::db::episodes::EpisodeRow;
use crate::db::works::WorkRow;

/// A comment as surfaced inside the work detail view
#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    #[serde(rename = "commentId")]
    pub comment_id: i64,
    #[serde(rename = "authorNickname")]
    pub author_nickname: Option<String>,
    pub content: String,
    pub created_at: String,
}

impl From<CommentWithAuthor> for CommentView {
    fn from(comment: CommentWithAuthor) -> Self {
        Self {
            comment_id: comment.id,
            author_nickname: comment.author_nickname,
            content: comment.content,
            created_at: comment.created_at,
        }
    }
}

/// An episode with its comments attached
#[derive(Debug, Clone, Serialize)]
pub struct EpisodeView {
    pub id: i64,
    #[serde(rename = "workId")]
    pub work_id: i64,
    #[serde(rename = "episodeNumber")]
    pub episode_number: i64,
    pub content: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    pub comments: Vec<CommentView>,
}

impl EpisodeView {
    pub fn new(episode: EpisodeRow, comments: Vec<CommentView>) -> Self {
        Self {
            id: episode.id,
            work_id: episode.work_id,
            episode_number: episode.episode_number,
            content: episode.content,
            created_at: episode.created_at,
            comments,
        }
    }
}

/// A work with episodes (and their comments) nested in
#[derive(Debug, Clone, Serialize)]
pub struct WorkDetailView {
    #[serde(flatten)]
    pub work: WorkRow,
    pub episodes: Vec<EpisodeView>,
}

/// The per-user dashboard composite
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub profile: ProfileInfo,
    #[serde(rename = "recentViews")]
    pub recent_views: Vec<WorkWithAuthor>,
    #[serde(rename = "myWorks")]
    pub my_works: Vec<AuthoredWork>,
    #[serde(rename = "likedWorks")]
    pub liked_works: Vec<WorkWithAuthor>,
}

/// One work in an author's public listing
#[derive(Debug, Clone, Serialize)]
pub struct AuthorWorkItem {
    pub id: i64,
    pub title: String,
    pub likes: i64,
    pub description: String,
    pub cover_image: String,
}

impl From<WorkRow> for AuthorWorkItem {
    fn from(work: WorkRow) -> Self {
        Self {
            id: work.id,
            title: work.title,
            likes: work.likes,
            description: work.description,
            cover_image: work.image,
        }
    }
}

/// An author's public listing
#[derive(Debug, Clone, Serialize)]
pub struct AuthorWorksView {
    #[serde(rename = "authorName")]
    pub author_name: String,
    pub works: Vec<AuthorWorkItem>,
}
