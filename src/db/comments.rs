//! Comment reads (and the row writer behind them)
//!
//! The platform core has no comment endpoint; comments surface only inside
//! the work detail aggregation, joined with the commenter's nickname and
//! ordered oldest-first.

use rusqlite::{params, Connection};

use crate::db::now_timestamp;
use crate::error::ApiError;

/// Comment joined with its author's nickname
#[derive(Debug, Clone)]
pub struct CommentWithAuthor {
    pub id: i64,
    pub author_nickname: Option<String>,
    pub content: String,
    pub created_at: String,
}

/// Comments of an episode, created_at ascending
pub fn list_for_episode(
    conn: &Connection,
    episode_id: i64,
) -> Result<Vec<CommentWithAuthor>, ApiError> {
    let mut stmt = conn.prepare(
        "SELECT c.id, u.nickname, c.content, c.created_at
         FROM comments c
         JOIN users u ON c.user_id = u.id
         WHERE c.episode_id = ?
         ORDER BY c.created_at ASC",
    )?;

    let rows = stmt.query_map(params![episode_id], |row| {
        Ok(CommentWithAuthor {
            id: row.get(0)?,
            author_nickname: row.get(1)?,
            content: row.get(2)?,
            created_at: row.get(3)?,
        })
    })?;

    let mut comments = vec![];
    for row in rows {
        comments.push(row?);
    }
    Ok(comments)
}

/// Insert a comment with a server-assigned timestamp. Returns the row id.
pub fn insert_comment(
    conn: &Connection,
    episode_id: i64,
    user_id: i64,
    content: &str,
) -> Result<i64, ApiError> {
    insert_comment_at(conn, episode_id, user_id, content, &now_timestamp())
}

/// Insert a comment with an explicit timestamp
pub fn insert_comment_at(
    conn: &Connection,
    episode_id: i64,
    user_id: i64,
    content: &str,
    created_at: &str,
) -> Result<i64, ApiError> {
    conn.execute(
        "INSERT INTO comments (episode_id, user_id, content, created_at)
         VALUES (?, ?, ?, ?)",
        params![episode_id, user_id, content, created_at],
    )?;

    Ok(conn.last_insert_rowid())
}
