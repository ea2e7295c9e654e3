//! Share-link rows.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareLinkRecord {
    pub id: String,
    pub meeting_id: String,
    pub token: String,
    pub expires_at: Option<String>,
    pub created_at: String,
    pub last_accessed_at: Option<String>,
    pub disabled: bool,
}

impl ShareLinkRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            meeting_id: row.get(1)?,
            token: row.get(2)?,
            expires_at: row.get(3)?,
            created_at: row.get(4)?,
            last_accessed_at: row.get(5)?,
            disabled: row.get(6)?,
        })
    }

    /// A link without an expiry, or with one that does not parse, never expires.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .as_deref()
            .and_then(super::parse_timestamp)
            .map(|expires_at| expires_at < now)
            .unwrap_or(false)
    }
}

const SELECT_COLUMNS: &str =
    "SELECT id, meeting_id, token, expires_at, created_at, last_accessed_at, disabled FROM share_links";

pub struct ShareLinkRepository;

impl ShareLinkRepository {
    pub fn insert(
        conn: &Connection,
        meeting_id: &str,
        token: &str,
        expires_at: Option<&str>,
    ) -> Result<ShareLinkRecord> {
        let record = ShareLinkRecord {
            id: uuid::Uuid::new_v4().to_string(),
            meeting_id: meeting_id.to_string(),
            token: token.to_string(),
            expires_at: expires_at.map(str::to_string),
            created_at: super::now_timestamp(),
            last_accessed_at: None,
            disabled: false,
        };

        conn.execute(
            "INSERT INTO share_links (id, meeting_id, token, expires_at, created_at, disabled) \
             VALUES (?1, ?2, ?3, ?4, ?5, 0)",
            params![
                record.id,
                record.meeting_id,
                record.token,
                record.expires_at,
                record.created_at
            ],
        )
        .context("Failed to insert share link")?;

        Ok(record)
    }

    /// All links of a meeting, newest first, including disabled ones.
    pub fn list_for_meeting(conn: &Connection, meeting_id: &str) -> Result<Vec<ShareLinkRecord>> {
        let mut stmt = conn
            .prepare(&format!(
                "{} WHERE meeting_id = ?1 ORDER BY created_at DESC, rowid DESC",
                SELECT_COLUMNS
            ))
            .context("Failed to prepare share links query")?;

        let links = stmt
            .query_map(params![meeting_id], ShareLinkRecord::from_row)
            .context("Failed to query share links")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("Failed to map share links")?;

        Ok(links)
    }

    /// Link for `token` unless it has been disabled. Expiry is not checked.
    pub fn find_enabled(conn: &Connection, token: &str) -> Result<Option<ShareLinkRecord>> {
        conn.query_row(
            &format!("{} WHERE token = ?1 AND disabled = 0", SELECT_COLUMNS),
            params![token],
            ShareLinkRecord::from_row,
        )
        .optional()
        .context("Failed to query share link")
    }

    pub fn disable(conn: &Connection, token: &str) -> Result<usize> {
        conn.execute(
            "UPDATE share_links SET disabled = 1 WHERE token = ?1",
            params![token],
        )
        .context("Failed to disable share link")
    }

    pub fn touch(conn: &Connection, id: &str, accessed_at: &str) -> Result<()> {
        conn.execute(
            "UPDATE share_links SET last_accessed_at = ?1 WHERE id = ?2",
            params![accessed_at, id],
        )
        .context("Failed to record share link access")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_connection;
    use chrono::TimeZone;

    #[test]
    fn test_insert_and_list() {
        let conn = test_connection();
        let first = ShareLinkRepository::insert(&conn, "m1", "aaa", None).unwrap();
        let second = ShareLinkRepository::insert(&conn, "m1", "bbb", Some("2030-01-01T00:00:00.000Z")).unwrap();
        ShareLinkRepository::insert(&conn, "m2", "ccc", None).unwrap();

        let links = ShareLinkRepository::list_for_meeting(&conn, "m1").unwrap();
        assert_eq!(links, vec![second, first]);
    }

    #[test]
    fn test_disable_hides_link() {
        let conn = test_connection();
        ShareLinkRepository::insert(&conn, "m1", "tok", None).unwrap();
        assert!(ShareLinkRepository::find_enabled(&conn, "tok").unwrap().is_some());

        assert_eq!(ShareLinkRepository::disable(&conn, "tok").unwrap(), 1);
        assert!(ShareLinkRepository::find_enabled(&conn, "tok").unwrap().is_none());
        assert_eq!(ShareLinkRepository::disable(&conn, "missing").unwrap(), 0);

        let links = ShareLinkRepository::list_for_meeting(&conn, "m1").unwrap();
        assert!(links[0].disabled);
    }

    #[test]
    fn test_touch_records_access() {
        let conn = test_connection();
        let link = ShareLinkRepository::insert(&conn, "m1", "tok", None).unwrap();
        ShareLinkRepository::touch(&conn, &link.id, "2024-01-01T00:00:00.000Z").unwrap();

        let link = ShareLinkRepository::find_enabled(&conn, "tok").unwrap().unwrap();
        assert_eq!(link.last_accessed_at.as_deref(), Some("2024-01-01T00:00:00.000Z"));
    }

    #[test]
    fn test_is_expired_at() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let mut link = ShareLinkRecord {
            id: "id".to_string(),
            meeting_id: "m".to_string(),
            token: "t".to_string(),
            expires_at: None,
            created_at: "2024-01-01T00:00:00.000Z".to_string(),
            last_accessed_at: None,
            disabled: false,
        };
        assert!(!link.is_expired_at(now));

        link.expires_at = Some("2024-05-31T23:59:59.000Z".to_string());
        assert!(link.is_expired_at(now));

        link.expires_at = Some("2024-06-02T00:00:00.000Z".to_string());
        assert!(!link.is_expired_at(now));

        link.expires_at = Some("not a date".to_string());
        assert!(!link.is_expired_at(now));
    }
}
