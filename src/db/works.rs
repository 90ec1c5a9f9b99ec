//! Work CRUD operations
//!
//! Ownership rules are enforced here, closest to the data:
//! - `update_work` guards with a combined (id, author_id) predicate, so a
//!   missing work and a non-owned work are indistinguishable (both answer
//!   `Forbidden`).
//! - `delete_work` loads by id first and answers `NotFound` before comparing
//!   the owner, so missing and non-owned are distinguished.
//!
//! The asymmetry is intentional and covered by tests.

use rusqlite::{params, Connection, Row};
use serde::Serialize;

use crate::error::ApiError;

/// Work row from database
#[derive(Debug, Clone, Serialize)]
pub struct WorkRow {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub category: String,
    pub image: String,
    pub description: String,
    pub author_id: i64,
    pub author_name: String,
    pub likes: i64,
    pub views: i64,
}

impl WorkRow {
    fn from_row(row: &Row) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            content: row.get("content")?,
            category: row.get("category")?,
            image: row.get("image")?,
            description: row.get("description")?,
            author_id: row.get("author_id")?,
            author_name: row.get("author_name")?,
            likes: row.get("likes")?,
            views: row.get("views")?,
        })
    }
}

/// The five mutable fields of a work. Creation and update both take the
/// whole set; partial update is not supported on this path.
#[derive(Debug, Clone)]
pub struct WorkFields {
    pub title: String,
    pub content: String,
    pub category: String,
    pub image: String,
    pub description: String,
}

/// Create a work. `author_name` is denormalized from the author's user row,
/// resolved by the caller. Returns the new row id.
pub fn create_work(
    conn: &Connection,
    author_id: i64,
    author_name: &str,
    fields: &WorkFields,
) -> Result<i64, ApiError> {
    conn.execute(
        "INSERT INTO works (title, content, category, image, description, author_id, author_name)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
        params![
            fields.title,
            fields.content,
            fields.category,
            fields.image,
            fields.description,
            author_id,
            author_name,
        ],
    )?;

    Ok(conn.last_insert_rowid())
}

pub fn get_work(conn: &Connection, id: i64) -> Result<Option<WorkRow>, ApiError> {
    let mut stmt = conn.prepare("SELECT * FROM works WHERE id = ?")?;
    let mut rows = stmt.query(params![id])?;

    match rows.next()? {
        Some(row) => Ok(Some(WorkRow::from_row(row)?)),
        None => Ok(None),
    }
}

pub fn list_works(conn: &Connection) -> Result<Vec<WorkRow>, ApiError> {
    let mut stmt = conn.prepare("SELECT * FROM works")?;
    let rows = stmt.query_map([], |row| WorkRow::from_row(row))?;

    let mut works = vec![];
    for row in rows {
        works.push(row?);
    }
    Ok(works)
}

/// The most-liked works, likes descending
pub fn list_top(conn: &Connection, limit: u32) -> Result<Vec<WorkRow>, ApiError> {
    let mut stmt = conn.prepare("SELECT * FROM works ORDER BY likes DESC LIMIT ?")?;
    let rows = stmt.query_map(params![limit], |row| WorkRow::from_row(row))?;

    let mut works = vec![];
    for row in rows {
        works.push(row?);
    }
    Ok(works)
}

pub fn list_by_author(conn: &Connection, author_id: i64) -> Result<Vec<WorkRow>, ApiError> {
    let mut stmt = conn.prepare("SELECT * FROM works WHERE author_id = ?")?;
    let rows = stmt.query_map(params![author_id], |row| WorkRow::from_row(row))?;

    let mut works = vec![];
    for row in rows {
        works.push(row?);
    }
    Ok(works)
}

/// Replace all five mutable fields of a work owned by `actor_id`.
///
/// Answers `Forbidden` whether the work is missing or owned by someone
/// else; the combined predicate does not reveal which.
pub fn update_work(
    conn: &Connection,
    work_id: i64,
    actor_id: i64,
    fields: &WorkFields,
) -> Result<(), ApiError> {
    let changed = conn.execute(
        "UPDATE works SET title = ?, content = ?, category = ?, image = ?, description = ?
         WHERE id = ? AND author_id = ?",
        params![
            fields.title,
            fields.content,
            fields.category,
            fields.image,
            fields.description,
            work_id,
            actor_id,
        ],
    )?;

    if changed == 0 {
        return Err(ApiError::Forbidden(
            "no permission to update this work".to_string(),
        ));
    }

    Ok(())
}

/// Delete a work. `NotFound` when the work is absent, `Forbidden` when it
/// exists but the actor is not its author.
pub fn delete_work(conn: &Connection, work_id: i64, actor_id: i64) -> Result<(), ApiError> {
    let author_id: Option<i64> = conn
        .query_row(
            "SELECT author_id FROM works WHERE id = ?",
            params![work_id],
            |row| row.get(0),
        )
        .map(Some)
        .or_else(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => Ok(None),
            other => Err(other),
        })?;

    let author_id = author_id.ok_or_else(|| ApiError::NotFound("work not found".to_string()))?;

    if author_id != actor_id {
        return Err(ApiError::Forbidden(
            "no permission to delete this work".to_string(),
        ));
    }

    conn.execute("DELETE FROM works WHERE id = ?", params![work_id])?;
    Ok(())
}
