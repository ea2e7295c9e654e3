//! Summary rows and the three-step summary save.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::action_items::ActionItemRepository;
use crate::summary::{to_persisted, to_summary, PersistedSummary, SummaryResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub meeting_id: String,
    pub overview: Option<String>,
    pub decisions: Option<String>,
    pub discussions: Option<String>,
    pub updated_at: String,
}

/// Steps of a summary save, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStep {
    UpsertSummary,
    ClearActionItems,
    InsertActionItems,
}

impl SaveStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UpsertSummary => "upsert_summary",
            Self::ClearActionItems => "clear_action_items",
            Self::InsertActionItems => "insert_action_items",
        }
    }
}

impl std::fmt::Display for SaveStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A save that stopped part way. Steps before `step` stay committed.
#[derive(Debug, Error)]
#[error("summary save failed at step {step}")]
pub struct SummarySaveError {
    pub step: SaveStep,
    #[source]
    pub source: anyhow::Error,
}

pub struct SummaryRepository;

impl SummaryRepository {
    pub fn upsert(conn: &Connection, meeting_id: &str, summary: &PersistedSummary) -> Result<()> {
        conn.execute(
            "INSERT INTO summaries (meeting_id, overview, decisions, discussions, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5) \
             ON CONFLICT(meeting_id) DO UPDATE SET overview = excluded.overview, \
             decisions = excluded.decisions, discussions = excluded.discussions, \
             updated_at = excluded.updated_at",
            params![
                meeting_id,
                summary.overview,
                summary.decisions,
                summary.discussions,
                super::now_timestamp()
            ],
        )
        .context("Failed to upsert summary")?;
        Ok(())
    }

    pub fn get(conn: &Connection, meeting_id: &str) -> Result<Option<SummaryRecord>> {
        conn.query_row(
            "SELECT meeting_id, overview, decisions, discussions, updated_at \
             FROM summaries WHERE meeting_id = ?1",
            params![meeting_id],
            |row| {
                Ok(SummaryRecord {
                    meeting_id: row.get(0)?,
                    overview: row.get(1)?,
                    decisions: row.get(2)?,
                    discussions: row.get(3)?,
                    updated_at: row.get(4)?,
                })
            },
        )
        .optional()
        .context("Failed to query summary")
    }

    /// Canonical summary of a meeting, or `None` when no summary row exists.
    pub fn load(conn: &Connection, meeting_id: &str) -> Result<Option<SummaryResult>> {
        let Some(row) = Self::get(conn, meeting_id)? else {
            return Ok(None);
        };
        let items = ActionItemRepository::list(conn, meeting_id)?;

        Ok(Some(to_summary(
            row.overview.as_deref(),
            row.decisions.as_deref(),
            row.discussions.as_deref(),
            &items,
        )))
    }

    /// Upsert the summary row, clear the meeting's action items, insert the
    /// new ones. The steps are not wrapped in a transaction; a failure
    /// reports the step it stopped at.
    pub fn save(
        conn: &Connection,
        meeting_id: &str,
        summary: &SummaryResult,
    ) -> std::result::Result<(), SummarySaveError> {
        Self::upsert(conn, meeting_id, &to_persisted(summary)).map_err(failed_at(SaveStep::UpsertSummary))?;
        ActionItemRepository::delete_for_meeting(conn, meeting_id)
            .map_err(failed_at(SaveStep::ClearActionItems))?;
        if !summary.action_items.is_empty() {
            ActionItemRepository::insert_many(conn, meeting_id, &summary.action_items)
                .map_err(failed_at(SaveStep::InsertActionItems))?;
        }
        Ok(())
    }
}

fn failed_at(step: SaveStep) -> impl FnOnce(anyhow::Error) -> SummarySaveError {
    move |source| SummarySaveError { step, source }
}
