use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

pub fn open(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path).context("Failed to open database connection")?;
    conn.busy_timeout(std::time::Duration::from_secs(5))
        .context("Failed to set busy timeout")?;
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS meetings (
            id TEXT PRIMARY KEY,
            title TEXT,
            status TEXT NOT NULL DEFAULT 'uploaded',
            scheduled_at TEXT,
            created_at TEXT NOT NULL
        )",
        [],
    )
    .context("Failed to create meetings table")?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_meetings_created_at ON meetings(created_at DESC)",
        [],
    )
    .context("Failed to create meetings created_at index")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS recordings (
            id TEXT PRIMARY KEY,
            meeting_id TEXT NOT NULL,
            storage_path TEXT,
            status TEXT NOT NULL DEFAULT 'uploaded',
            transcript_text TEXT,
            created_at TEXT NOT NULL
        )",
        [],
    )
    .context("Failed to create recordings table")?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_recordings_meeting ON recordings(meeting_id, created_at DESC)",
        [],
    )
    .context("Failed to create recordings meeting index")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS summaries (
            meeting_id TEXT PRIMARY KEY,
            overview TEXT,
            decisions TEXT,
            discussions TEXT,
            updated_at TEXT NOT NULL
        )",
        [],
    )
    .context("Failed to create summaries table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS action_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            meeting_id TEXT NOT NULL,
            description TEXT,
            assignee TEXT,
            due_date TEXT,
            confidence REAL,
            status TEXT NOT NULL DEFAULT 'pending'
        )",
        [],
    )
    .context("Failed to create action_items table")?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_action_items_meeting ON action_items(meeting_id)",
        [],
    )
    .context("Failed to create action_items meeting index")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS diagrams (
            id TEXT PRIMARY KEY,
            meeting_id TEXT NOT NULL UNIQUE,
            type TEXT,
            mermaid_source TEXT,
            updated_at TEXT NOT NULL
        )",
        [],
    )
    .context("Failed to create diagrams table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS share_links (
            id TEXT PRIMARY KEY,
            meeting_id TEXT NOT NULL,
            token TEXT NOT NULL UNIQUE,
            expires_at TEXT,
            created_at TEXT NOT NULL,
            last_accessed_at TEXT,
            disabled INTEGER NOT NULL DEFAULT 0
        )",
        [],
    )
    .context("Failed to create share_links table")?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_share_links_meeting ON share_links(meeting_id, created_at DESC)",
        [],
    )
    .context("Failed to create share_links meeting index")?;

    Ok(())
}
