//! Stored Mermaid documents, one per meeting.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

pub const SUMMARY_DIAGRAM_TYPE: &str = "summary";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramRecord {
    pub id: String,
    pub meeting_id: String,
    #[serde(rename = "type")]
    pub diagram_type: Option<String>,
    pub mermaid_source: Option<String>,
    pub updated_at: String,
}

pub struct DiagramRepository;

impl DiagramRepository {
    /// Replace the meeting's diagram source, inserting a row on first use.
    pub fn upsert(conn: &Connection, meeting_id: &str, mermaid_source: &str) -> Result<()> {
        conn.execute(
            "INSERT INTO diagrams (id, meeting_id, type, mermaid_source, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5) \
             ON CONFLICT(meeting_id) DO UPDATE SET mermaid_source = excluded.mermaid_source, \
             updated_at = excluded.updated_at",
            params![
                uuid::Uuid::new_v4().to_string(),
                meeting_id,
                SUMMARY_DIAGRAM_TYPE,
                mermaid_source,
                super::now_timestamp()
            ],
        )
        .context("Failed to upsert diagram")?;
        Ok(())
    }

    pub fn latest(conn: &Connection, meeting_id: &str) -> Result<Option<DiagramRecord>> {
        conn.query_row(
            "SELECT id, meeting_id, type, mermaid_source, updated_at FROM diagrams \
             WHERE meeting_id = ?1 ORDER BY updated_at DESC LIMIT 1",
            params![meeting_id],
            |row| {
                Ok(DiagramRecord {
                    id: row.get(0)?,
                    meeting_id: row.get(1)?,
                    diagram_type: row.get(2)?,
                    mermaid_source: row.get(3)?,
                    updated_at: row.get(4)?,
                })
            },
        )
        .optional()
        .context("Failed to query diagram")
    }

    /// Ids of diagrams last updated before `cutoff`, at most `limit`.
    pub fn updated_before(conn: &Connection, cutoff: &str, limit: usize) -> Result<Vec<String>> {
        let mut stmt = conn
            .prepare("SELECT id FROM diagrams WHERE updated_at < ?1 ORDER BY updated_at ASC LIMIT ?2")
            .context("Failed to prepare expired diagrams query")?;

        let ids = stmt
            .query_map(params![cutoff, limit as i64], |row| row.get(0))
            .context("Failed to query expired diagrams")?
            .collect::<std::result::Result<Vec<String>, _>>()
            .context("Failed to map expired diagrams")?;

        Ok(ids)
    }

    pub fn delete_many(conn: &Connection, ids: &[String]) -> Result<usize> {
        let mut stmt = conn
            .prepare("DELETE FROM diagrams WHERE id = ?1")
            .context("Failed to prepare diagram delete")?;

        let mut deleted = 0;
        for id in ids {
            deleted += stmt.execute(params![id]).context("Failed to delete diagram")?;
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_connection;

    #[test]
    fn test_upsert_keeps_single_row() {
        let conn = test_connection();
        DiagramRepository::upsert(&conn, "m1", "graph TD\n  a").unwrap();
        let first = DiagramRepository::latest(&conn, "m1").unwrap().unwrap();

        DiagramRepository::upsert(&conn, "m1", "graph TD\n  b").unwrap();
        let second = DiagramRepository::latest(&conn, "m1").unwrap().unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.mermaid_source.as_deref(), Some("graph TD\n  b"));
        assert_eq!(second.diagram_type.as_deref(), Some("summary"));

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM diagrams", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_updated_before_and_delete() {
        let conn = test_connection();
        DiagramRepository::upsert(&conn, "m1", "graph TD").unwrap();
        DiagramRepository::upsert(&conn, "m2", "graph TD").unwrap();
        conn.execute(
            "UPDATE diagrams SET updated_at = '2020-01-01T00:00:00.000Z' WHERE meeting_id = 'm1'",
            [],
        )
        .unwrap();

        let expired = DiagramRepository::updated_before(&conn, "2021-01-01T00:00:00.000Z", 10).unwrap();
        assert_eq!(expired.len(), 1);

        assert_eq!(DiagramRepository::delete_many(&conn, &expired).unwrap(), 1);
        assert!(DiagramRepository::latest(&conn, "m1").unwrap().is_none());
        assert!(DiagramRepository::latest(&conn, "m2").unwrap().is_some());
    }

    #[test]
    fn test_record_serializes_type_field() {
        let record = DiagramRecord {
            id: "d".to_string(),
            meeting_id: "m".to_string(),
            diagram_type: Some("summary".to_string()),
            mermaid_source: None,
            updated_at: "t".to_string(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "summary");
    }
}
