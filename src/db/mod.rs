//! SQLite persistence.
//!
//! Raw SQL with rusqlite, one repository struct per table. Async callers go
//! through [`Database::call`], which opens a connection on the blocking pool
//! for the duration of one closure.

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Connection;
use std::path::{Path, PathBuf};

pub mod action_items;
pub mod diagrams;
mod init;
pub mod meetings;
pub mod recordings;
pub mod share_links;
pub mod summaries;

pub use action_items::{ActionItemRecord, ActionItemRepository};
pub use diagrams::{DiagramRecord, DiagramRepository};
pub use init::{migrate, open};
pub use meetings::{MeetingRecord, MeetingRepository};
pub use recordings::{RecordingRecord, RecordingRepository};
pub use share_links::{ShareLinkRecord, ShareLinkRepository};
pub use summaries::{SaveStep, SummaryRecord, SummaryRepository, SummarySaveError};

/// Handle to the database file. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    /// Open (creating and migrating if needed) the database at `path`.
    pub fn open_at(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create database directory")?;
        }

        let conn = open(&path)?;
        migrate(&conn)?;

        Ok(Self { path })
    }

    pub fn open_default() -> Result<Self> {
        Self::open_at(crate::global::db_file()?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` against a fresh connection on the blocking pool.
    pub async fn call<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || {
            let conn = open(&path)?;
            f(&conn)
        })
        .await
        .context("Database task panicked")?
    }
}

/// Timestamp format stored in every `*_at` column. Sorts lexicographically.
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn now_timestamp() -> String {
    timestamp(Utc::now())
}

pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

#[cfg(test)]
pub(crate) fn test_connection() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    migrate(&conn).unwrap();
    conn
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_round_trip() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let stored = timestamp(at);
        assert_eq!(stored, "2024-03-01T12:30:00.000Z");
        assert_eq!(parse_timestamp(&stored), Some(at));
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[tokio::test]
    async fn test_database_call_runs_on_file() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(dir.path().join("nested").join("test.db")).unwrap();

        let count = db
            .call(|conn| {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM meetings", [], |row| row.get(0))?;
                Ok(count)
            })
            .await
            .unwrap();

        assert_eq!(count, 0);
        assert!(db.path().exists());
    }
}
