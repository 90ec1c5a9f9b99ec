//! Dashboard aggregation reads
//!
//! Four independent reads composed into one response: profile fields, the
//! five most recently viewed works, authored works, and liked works. Any
//! failing read fails the whole call.

use rusqlite::{params, Connection};
use serde::Serialize;

use crate::error::ApiError;

/// Profile fields surfaced on the dashboard
#[derive(Debug, Clone, Serialize)]
pub struct ProfileInfo {
    pub username: String,
    pub name: String,
    pub age: i64,
    pub profile_image: Option<String>,
}

/// A recently viewed or liked work, with its author's name joined in
#[derive(Debug, Clone, Serialize)]
pub struct WorkWithAuthor {
    pub id: i64,
    pub title: String,
    pub image: String,
    pub author_name: String,
}

/// A work authored by the dashboard's user
#[derive(Debug, Clone, Serialize)]
pub struct AuthoredWork {
    pub id: i64,
    pub title: String,
    pub image: String,
    pub description: String,
    pub likes: i64,
}

pub fn profile(conn: &Connection, user_id: i64) -> Result<Option<ProfileInfo>, ApiError> {
    let mut stmt =
        conn.prepare("SELECT username, name, age, profile_image FROM users WHERE id = ?")?;
    let mut rows = stmt.query(params![user_id])?;

    match rows.next()? {
        Some(row) => Ok(Some(ProfileInfo {
            username: row.get(0)?,
            name: row.get(1)?,
            age: row.get(2)?,
            profile_image: row.get(3)?,
        })),
        None => Ok(None),
    }
}

/// The five most recently viewed works, newest first
pub fn recent_views(conn: &Connection, user_id: i64) -> Result<Vec<WorkWithAuthor>, ApiError> {
    let mut stmt = conn.prepare(
        "SELECT w.id, w.title, w.image, u.name
         FROM view_events v
         JOIN works w ON v.work_id = w.id
         JOIN users u ON w.author_id = u.id
         WHERE v.user_id = ?
         ORDER BY v.viewed_at DESC
         LIMIT 5",
    )?;

    collect_works_with_author(stmt.query_map(params![user_id], map_work_with_author)?)
}

pub fn authored_works(conn: &Connection, user_id: i64) -> Result<Vec<AuthoredWork>, ApiError> {
    let mut stmt = conn.prepare(
        "SELECT id, title, image, description, likes FROM works WHERE author_id = ?",
    )?;

    let rows = stmt.query_map(params![user_id], |row| {
        Ok(AuthoredWork {
            id: row.get(0)?,
            title: row.get(1)?,
            image: row.get(2)?,
            description: row.get(3)?,
            likes: row.get(4)?,
        })
    })?;

    let mut works = vec![];
    for row in rows {
        works.push(row?);
    }
    Ok(works)
}

pub fn liked_works(conn: &Connection, user_id: i64) -> Result<Vec<WorkWithAuthor>, ApiError> {
    let mut stmt = conn.prepare(
        "SELECT w.id, w.title, w.image, u.name
         FROM like_events l
         JOIN works w ON l.work_id = w.id
         JOIN users u ON w.author_id = u.id
         WHERE l.user_id = ?",
    )?;

    collect_works_with_author(stmt.query_map(params![user_id], map_work_with_author)?)
}

fn map_work_with_author(row: &rusqlite::Row) -> Result<WorkWithAuthor, rusqlite::Error> {
    Ok(WorkWithAuthor {
        id: row.get(0)?,
        title: row.get(1)?,
        image: row.get(2)?,
        author_name: row.get(3)?,
    })
}

fn collect_works_with_author<I>(rows: I) -> Result<Vec<WorkWithAuthor>, ApiError>
where
    I: Iterator<Item = Result<WorkWithAuthor, rusqlite::Error>>,
{
    let mut works = vec![];
    for row in rows {
        works.push(row?);
    }
    Ok(works)
}
