//! Recording record persistence.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::meeting::ProcessingStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingRecord {
    pub id: String,
    pub meeting_id: String,
    pub storage_path: Option<String>,
    pub status: String,
    pub transcript_text: Option<String>,
    pub created_at: String,
}

impl RecordingRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            meeting_id: row.get(1)?,
            storage_path: row.get(2)?,
            status: row.get(3)?,
            transcript_text: row.get(4)?,
            created_at: row.get(5)?,
        })
    }
}

const SELECT_COLUMNS: &str =
    "SELECT id, meeting_id, storage_path, status, transcript_text, created_at FROM recordings";
const NEWEST_FIRST: &str = "ORDER BY created_at DESC, rowid DESC";

pub struct RecordingRepository;

impl RecordingRepository {
    /// Insert an uploaded recording. Returns the new recording id.
    pub fn insert(conn: &Connection, meeting_id: &str, storage_path: &str) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string();
        conn.execute(
            "INSERT INTO recordings (id, meeting_id, storage_path, status, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                id,
                meeting_id,
                storage_path,
                ProcessingStatus::Uploaded.as_str(),
                super::now_timestamp()
            ],
        )
        .context("Failed to insert recording")?;
        Ok(id)
    }

    pub fn get(conn: &Connection, id: &str) -> Result<Option<RecordingRecord>> {
        conn.query_row(
            &format!("{} WHERE id = ?1", SELECT_COLUMNS),
            params![id],
            RecordingRecord::from_row,
        )
        .optional()
        .context("Failed to query recording")
    }

    /// Newest recording of a meeting, or the given one if it belongs to it.
    pub fn latest(
        conn: &Connection,
        meeting_id: &str,
        recording_id: Option<&str>,
    ) -> Result<Option<RecordingRecord>> {
        Self::first_match(conn, meeting_id, recording_id, "")
    }

    /// Like [`Self::latest`] but only recordings that carry a transcript.
    pub fn latest_transcribed(
        conn: &Connection,
        meeting_id: &str,
        recording_id: Option<&str>,
    ) -> Result<Option<RecordingRecord>> {
        Self::first_match(conn, meeting_id, recording_id, " AND transcript_text IS NOT NULL")
    }

    fn first_match(
        conn: &Connection,
        meeting_id: &str,
        recording_id: Option<&str>,
        extra_filter: &str,
    ) -> Result<Option<RecordingRecord>> {
        let sql = format!(
            "{} WHERE meeting_id = ?1 AND (?2 IS NULL OR id = ?2){} {} LIMIT 1",
            SELECT_COLUMNS, extra_filter, NEWEST_FIRST
        );
        conn.query_row(&sql, params![meeting_id, recording_id], RecordingRecord::from_row)
            .optional()
            .context("Failed to query latest recording")
    }

    /// Recordings of a meeting, newest first. `None` lists all of them.
    pub fn list_for_meeting(
        conn: &Connection,
        meeting_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<RecordingRecord>> {
        let limit = limit.map(|l| l as i64).unwrap_or(-1);
        let mut stmt = conn
            .prepare(&format!(
                "{} WHERE meeting_id = ?1 {} LIMIT ?2",
                SELECT_COLUMNS, NEWEST_FIRST
            ))
            .context("Failed to prepare recordings query")?;

        let recordings = stmt
            .query_map(params![meeting_id, limit], RecordingRecord::from_row)
            .context("Failed to list recordings")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("Failed to map recordings")?;

        Ok(recordings)
    }

    /// Store a transcript and mark the recording transcribed.
    pub fn set_transcript(conn: &Connection, id: &str, transcript: &str) -> Result<usize> {
        conn.execute(
            "UPDATE recordings SET transcript_text = ?1, status = ?2 WHERE id = ?3",
            params![transcript, ProcessingStatus::Transcribed.as_str(), id],
        )
        .context("Failed to store transcript")
    }

    pub fn update_status(conn: &Connection, id: &str, status: ProcessingStatus) -> Result<usize> {
        conn.execute(
            "UPDATE recordings SET status = ?1 WHERE id = ?2",
            params![status.as_str(), id],
        )
        .context("Failed to update recording status")
    }

    /// Oldest-first batch of recordings created before `cutoff`.
    pub fn created_before(conn: &Connection, cutoff: &str, limit: usize) -> Result<Vec<RecordingRecord>> {
        let mut stmt = conn
            .prepare(&format!(
                "{} WHERE created_at < ?1 ORDER BY created_at ASC LIMIT ?2",
                SELECT_COLUMNS
            ))
            .context("Failed to prepare expired recordings query")?;

        let recordings = stmt
            .query_map(params![cutoff, limit as i64], RecordingRecord::from_row)
            .context("Failed to query expired recordings")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("Failed to map expired recordings")?;

        Ok(recordings)
    }

    pub fn delete_many(conn: &Connection, ids: &[String]) -> Result<usize> {
        let mut stmt = conn
            .prepare("DELETE FROM recordings WHERE id = ?1")
            .context("Failed to prepare recording delete")?;

        let mut deleted = 0;
        for id in ids {
            deleted += stmt.execute(params![id]).context("Failed to delete recording")?;
        }
        Ok(deleted)
    }
}
