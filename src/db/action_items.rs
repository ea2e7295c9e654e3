//! Action-item rows. Rows are replaced wholesale on every summary save, so
//! ids are not stable across saves.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::meeting::ACTION_ITEM_PENDING;
use crate::summary::ActionItem;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionItemRecord {
    pub id: i64,
    pub meeting_id: String,
    pub description: Option<String>,
    pub assignee: Option<String>,
    pub due_date: Option<String>,
    pub confidence: Option<f64>,
    pub status: String,
}

impl ActionItemRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            meeting_id: row.get(1)?,
            description: row.get(2)?,
            assignee: row.get(3)?,
            due_date: row.get(4)?,
            confidence: row.get(5)?,
            status: row.get(6)?,
        })
    }
}

pub struct ActionItemRepository;

impl ActionItemRepository {
    /// Items of a meeting in insertion order.
    pub fn list(conn: &Connection, meeting_id: &str) -> Result<Vec<ActionItemRecord>> {
        let mut stmt = conn
            .prepare(
                "SELECT id, meeting_id, description, assignee, due_date, confidence, status \
                 FROM action_items WHERE meeting_id = ?1 ORDER BY id ASC",
            )
            .context("Failed to prepare action items query")?;

        let items = stmt
            .query_map(params![meeting_id], ActionItemRecord::from_row)
            .context("Failed to query action items")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("Failed to map action items")?;

        Ok(items)
    }

    pub fn delete_for_meeting(conn: &Connection, meeting_id: &str) -> Result<usize> {
        conn.execute(
            "DELETE FROM action_items WHERE meeting_id = ?1",
            params![meeting_id],
        )
        .context("Failed to delete action items")
    }

    pub fn insert_many(conn: &Connection, meeting_id: &str, items: &[ActionItem]) -> Result<usize> {
        let mut stmt = conn
            .prepare(
                "INSERT INTO action_items (meeting_id, description, assignee, due_date, confidence, status) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .context("Failed to prepare action item insert")?;

        for item in items {
            stmt.execute(params![
                meeting_id,
                item.description,
                item.assignee,
                item.due_date,
                item.confidence,
                ACTION_ITEM_PENDING,
            ])
            .context("Failed to insert action item")?;
        }

        Ok(items.len())
    }
}
