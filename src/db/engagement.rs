//! Engagement counters and per-user engagement events
//!
//! Counters are unconditional increments: repeated calls always add one, no
//! deduplication by user or time window. The event tables are what the
//! dashboard reads; the like membership set and the like counter can
//! legitimately diverge.

use rusqlite::{params, Connection};

use crate::db::now_timestamp;
use crate::error::ApiError;

/// Bump a work's view counter by one
pub fn increment_views(conn: &Connection, work_id: i64) -> Result<(), ApiError> {
    conn.execute(
        "UPDATE works SET views = views + 1 WHERE id = ?",
        params![work_id],
    )?;
    Ok(())
}

/// Bump a work's like counter by one
pub fn increment_likes(conn: &Connection, work_id: i64) -> Result<(), ApiError> {
    conn.execute(
        "UPDATE works SET likes = likes + 1 WHERE id = ?",
        params![work_id],
    )?;
    Ok(())
}

/// Record that a user viewed a work just now. One row per (user, work);
/// repeat views refresh the timestamp so the recent list holds distinct
/// works.
pub fn record_view(conn: &Connection, user_id: i64, work_id: i64) -> Result<(), ApiError> {
    conn.execute(
        "INSERT INTO view_events (user_id, work_id, viewed_at) VALUES (?, ?, ?)
         ON CONFLICT(user_id, work_id) DO UPDATE SET viewed_at = excluded.viewed_at",
        params![user_id, work_id, now_timestamp()],
    )?;
    Ok(())
}

/// Record like membership. Idempotent; the counter is bumped separately.
pub fn record_like(conn: &Connection, user_id: i64, work_id: i64) -> Result<(), ApiError> {
    conn.execute(
        "INSERT OR IGNORE INTO like_events (user_id, work_id) VALUES (?, ?)",
        params![user_id, work_id],
    )?;
    Ok(())
}
