//! User CRUD operations

use rusqlite::{params, Connection, Row};

use crate::error::ApiError;

/// User row from database
#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub name: String,
    pub age: i64,
    pub nickname: Option<String>,
    pub profile_image: Option<String>,
}

impl UserRow {
    fn from_row(row: &Row) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            username: row.get("username")?,
            password_hash: row.get("password_hash")?,
            name: row.get("name")?,
            age: row.get("age")?,
            nickname: row.get("nickname")?,
            profile_image: row.get("profile_image")?,
        })
    }
}

/// Partial profile update. String fields apply only when provided and
/// non-empty; `age` applies whenever provided, zero included. Absent fields
/// are left untouched.
#[derive(Debug, Default, Clone)]
pub struct ProfileChanges {
    pub username: Option<String>,
    pub name: Option<String>,
    pub age: Option<i64>,
    pub nickname: Option<String>,
    pub profile_image: Option<String>,
}

/// Check whether a username is already taken
pub fn username_exists(conn: &Connection, username: &str) -> Result<bool, ApiError> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?)",
        params![username],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

/// Create a user, returning the new row id.
///
/// The UNIQUE constraint on username is the authority for duplicates: a
/// concurrent registration that slips past any pre-check still fails here
/// and is reported as `Conflict`.
pub fn create_user(
    conn: &Connection,
    username: &str,
    password_hash: &str,
    name: &str,
    age: i64,
) -> Result<i64, ApiError> {
    let result = conn.execute(
        "INSERT INTO users (username, password_hash, name, age) VALUES (?, ?, ?, ?)",
        params![username, password_hash, name, age],
    );

    match result {
        Ok(_) => Ok(conn.last_insert_rowid()),
        Err(e) if is_unique_violation(&e) => Err(ApiError::Conflict(
            "an account with this username already exists".to_string(),
        )),
        Err(e) => Err(e.into()),
    }
}

pub fn find_by_username(conn: &Connection, username: &str) -> Result<Option<UserRow>, ApiError> {
    let mut stmt = conn.prepare("SELECT * FROM users WHERE username = ?")?;
    let mut rows = stmt.query(params![username])?;

    match rows.next()? {
        Some(row) => Ok(Some(UserRow::from_row(row)?)),
        None => Ok(None),
    }
}

pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<UserRow>, ApiError> {
    let mut stmt = conn.prepare("SELECT * FROM users WHERE id = ?")?;
    let mut rows = stmt.query(params![id])?;

    match rows.next()? {
        Some(row) => Ok(Some(UserRow::from_row(row)?)),
        None => Ok(None),
    }
}

/// Exact-name lookup, used by the author-works listing
pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<UserRow>, ApiError> {
    let mut stmt = conn.prepare("SELECT * FROM users WHERE name = ?")?;
    let mut rows = stmt.query(params![name])?;

    match rows.next()? {
        Some(row) => Ok(Some(UserRow::from_row(row)?)),
        None => Ok(None),
    }
}

/// Apply a partial profile update. Assembles the SET clause from the fields
/// that actually apply; with nothing to apply this is a successful no-op.
pub fn update_profile(
    conn: &Connection,
    user_id: i64,
    changes: &ProfileChanges,
) -> Result<(), ApiError> {
    let mut sets: Vec<&str> = vec![];
    let mut values: Vec<Box<dyn rusqlite::ToSql>> = vec![];

    if let Some(ref username) = changes.username {
        if !username.is_empty() {
            sets.push("username = ?");
            values.push(Box::new(username.clone()));
        }
    }
    if let Some(ref name) = changes.name {
        if !name.is_empty() {
            sets.push("name = ?");
            values.push(Box::new(name.clone()));
        }
    }
    if let Some(age) = changes.age {
        sets.push("age = ?");
        values.push(Box::new(age));
    }
    if let Some(ref nickname) = changes.nickname {
        if !nickname.is_empty() {
            sets.push("nickname = ?");
            values.push(Box::new(nickname.clone()));
        }
    }
    if let Some(ref profile_image) = changes.profile_image {
        if !profile_image.is_empty() {
            sets.push("profile_image = ?");
            values.push(Box::new(profile_image.clone()));
        }
    }

    if sets.is_empty() {
        return Ok(());
    }

    let sql = format!("UPDATE users SET {} WHERE id = ?", sets.join(", "));
    values.push(Box::new(user_id));

    let value_refs: Vec<&dyn rusqlite::ToSql> = values.iter().map(|v| v.as_ref()).collect();

    match conn.execute(&sql, value_refs.as_slice()) {
        Ok(_) => Ok(()),
        Err(e) if is_unique_violation(&e) => Err(ApiError::Conflict(
            "an account with this username already exists".to_string(),
        )),
        Err(e) => Err(e.into()),
    }
}

/// Whether a rusqlite error is a UNIQUE constraint violation
fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
