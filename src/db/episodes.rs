//! Episode numbering and reads
//!
//! Episode numbers are 1-based and contiguous per work. Numbering runs as a
//! count-then-insert inside one IMMEDIATE transaction, with the
//! (work_id, episode_number) unique index as backstop, so concurrent calls
//! for the same work cannot produce duplicate or gapped numbers.

use rusqlite::{params, Connection, Row, TransactionBehavior};

use crate::db::now_timestamp;
use crate::error::ApiError;

/// Episode row from database
#[derive(Debug, Clone)]
pub struct EpisodeRow {
    pub id: i64,
    pub work_id: i64,
    pub episode_number: i64,
    pub content: String,
    pub created_at: String,
}

impl EpisodeRow {
    fn from_row(row: &Row) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            work_id: row.get("work_id")?,
            episode_number: row.get("episode_number")?,
            content: row.get("content")?,
            created_at: row.get("created_at")?,
        })
    }
}

/// Append an episode to a work. Returns (episode_number, created_at).
pub fn add_episode(
    conn: &mut Connection,
    work_id: i64,
    content: &str,
) -> Result<(i64, String), ApiError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let count: i64 = tx.query_row(
        "SELECT COUNT(*) FROM episodes WHERE work_id = ?",
        params![work_id],
        |row| row.get(0),
    )?;

    let episode_number = count + 1;
    let created_at = now_timestamp();

    tx.execute(
        "INSERT INTO episodes (work_id, episode_number, content, created_at)
         VALUES (?, ?, ?, ?)",
        params![work_id, episode_number, content, created_at],
    )?;

    tx.commit()?;

    Ok((episode_number, created_at))
}

/// All episodes of a work, in reading order
pub fn list_for_work(conn: &Connection, work_id: i64) -> Result<Vec<EpisodeRow>, ApiError> {
    let mut stmt =
        conn.prepare("SELECT * FROM episodes WHERE work_id = ? ORDER BY episode_number ASC")?;
    let rows = stmt.query_map(params![work_id], |row| EpisodeRow::from_row(row))?;

    let mut episodes = vec![];
    for row in rows {
        episodes.push(row?);
    }
    Ok(episodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::users::create_user;
    use crate::db::works::{create_work, WorkFields};
    use crate::db::Database;

    fn seed_work(conn: &Connection) -> i64 {
        let alice = create_user(conn, "alice", "hash", "Alice", 30).unwrap();
        create_work(
            conn,
            alice,
            "Alice",
            &WorkFields {
                title: "Embers".to_string(),
                content: String::new(),
                category: String::new(),
                image: String::new(),
                description: String::new(),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_numbers_are_contiguous_from_one() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn_mut(|conn| {
            let work = seed_work(conn);

            for expected in 1..=4 {
                let (number, _) = add_episode(conn, work, "chapter text")?;
                assert_eq!(number, expected);
            }

            let episodes = list_for_work(conn, work)?;
            let numbers: Vec<i64> = episodes.iter().map(|e| e.episode_number).collect();
            assert_eq!(numbers, vec![1, 2, 3, 4]);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_numbering_is_per_work() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn_mut(|conn| {
            let alice = create_user(conn, "a", "hash", "A", 20).unwrap();
            let fields = WorkFields {
                title: "W".to_string(),
                content: String::new(),
                category: String::new(),
                image: String::new(),
                description: String::new(),
            };
            let first = create_work(conn, alice, "A", &fields)?;
            let second = create_work(conn, alice, "A", &fields)?;

            add_episode(conn, first, "one")?;
            add_episode(conn, first, "two")?;
            let (number, _) = add_episode(conn, second, "one")?;
            assert_eq!(number, 1);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_missing_work_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn_mut(|conn| {
            // foreign_keys=ON makes the insert fail rather than orphan the row
            assert!(add_episode(conn, 9999, "text").is_err());
            Ok(())
        })
        .unwrap();
    }
}
