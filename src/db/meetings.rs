//! Meeting record persistence.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::meeting::ProcessingStatus;

/// A meeting record from the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingRecord {
    pub id: String,
    pub title: Option<String>,
    pub status: String,
    pub scheduled_at: Option<String>,
    pub created_at: String,
}

impl MeetingRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            status: row.get(2)?,
            scheduled_at: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}

const SELECT_COLUMNS: &str = "SELECT id, title, status, scheduled_at, created_at FROM meetings";

/// Repository for meeting records.
pub struct MeetingRepository;

impl MeetingRepository {
    /// Create the meeting if missing, otherwise reset its status to uploaded.
    /// The title defaults to the id.
    pub fn upsert_uploaded(conn: &Connection, id: &str) -> Result<()> {
        conn.execute(
            "INSERT INTO meetings (id, title, status, created_at) VALUES (?1, ?1, ?2, ?3) \
             ON CONFLICT(id) DO UPDATE SET status = excluded.status",
            params![id, ProcessingStatus::Uploaded.as_str(), super::now_timestamp()],
        )
        .context("Failed to upsert meeting")?;
        Ok(())
    }

    pub fn update_status(conn: &Connection, id: &str, status: ProcessingStatus) -> Result<usize> {
        conn.execute(
            "UPDATE meetings SET status = ?1 WHERE id = ?2",
            params![status.as_str(), id],
        )
        .context("Failed to update meeting status")
    }

    pub fn get(conn: &Connection, id: &str) -> Result<Option<MeetingRecord>> {
        conn.query_row(
            &format!("{} WHERE id = ?1", SELECT_COLUMNS),
            params![id],
            MeetingRecord::from_row,
        )
        .optional()
        .context("Failed to query meeting")
    }

    /// List meetings, newest first.
    pub fn list(conn: &Connection, limit: usize) -> Result<Vec<MeetingRecord>> {
        let mut stmt = conn
            .prepare(&format!(
                "{} ORDER BY created_at DESC, rowid DESC LIMIT ?1",
                SELECT_COLUMNS
            ))
            .context("Failed to prepare meetings list query")?;

        let meetings = stmt
            .query_map(params![limit as i64], MeetingRecord::from_row)
            .context("Failed to list meetings")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("Failed to map meetings")?;

        Ok(meetings)
    }
}
