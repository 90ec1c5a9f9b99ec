//! SQLite database module for platform content
//!
//! Single-file SQLite store behind a mutex-guarded connection. Every store
//! operation runs to completion inside one lock hold, which gives each
//! mutating endpoint one short-lived transaction.
//!
//! ## Tables
//!
//! - `users` - credentials and profile fields
//! - `works` - serialized works with denormalized author name and counters
//! - `episodes` - ordered installments, numbered contiguously per work
//! - `comments` - per-episode reader comments
//! - `view_events` / `like_events` - per-user engagement, read by the dashboard

pub mod comments;
pub mod dashboard;
pub mod engagement;
pub mod episodes;
pub mod schema;
pub mod users;
pub mod works;

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::ApiError;

/// SQLite database handle
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create the database at the given path
    pub fn open(db_path: &Path) -> Result<Self, ApiError> {
        info!("Opening SQLite database at {:?}", db_path);

        let conn = Connection::open(db_path)
            .map_err(|e| ApiError::Internal(format!("Failed to open SQLite: {}", e)))?;

        // WAL for concurrent readers; foreign keys give cascading deletes
        conn.execute_batch(
            "PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL; PRAGMA foreign_keys=ON;",
        )
        .map_err(|e| ApiError::Internal(format!("Failed to set PRAGMA: {}", e)))?;

        let db = Self {
            conn: Mutex::new(conn),
        };

        db.init_schema()?;

        Ok(db)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self, ApiError> {
        debug!("Opening in-memory SQLite database");

        let conn = Connection::open_in_memory()
            .map_err(|e| ApiError::Internal(format!("Failed to open in-memory SQLite: {}", e)))?;

        conn.execute_batch("PRAGMA foreign_keys=ON;")
            .map_err(|e| ApiError::Internal(format!("Failed to set PRAGMA: {}", e)))?;

        let db = Self {
            conn: Mutex::new(conn),
        };

        db.init_schema()?;

        Ok(db)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<(), ApiError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ApiError::Internal(format!("Lock poisoned: {}", e)))?;

        schema::init_schema(&conn)?;

        Ok(())
    }

    /// Run a read operation against the connection
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Connection) -> Result<T, ApiError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ApiError::Internal(format!("Lock poisoned: {}", e)))?;
        f(&conn)
    }

    /// Run a write operation with exclusive access (for transactions)
    pub fn with_conn_mut<F, T>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&mut Connection) -> Result<T, ApiError>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| ApiError::Internal(format!("Lock poisoned: {}", e)))?;
        f(&mut conn)
    }
}

/// Timestamp format used on episode and comment rows (UTC)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current UTC timestamp in the row format
pub fn now_timestamp() -> String {
    chrono::Utc::now().format(TIMESTAMP_FORMAT).to_string()
}
