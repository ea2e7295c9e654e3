//! Read-side views: meeting status, meeting history and transcript search.

use serde::{Deserialize, Serialize};

use super::{MeetingService, STATUS_RECORDING_LIMIT};
use crate::db::{
    ActionItemRecord, ActionItemRepository, MeetingRecord, MeetingRepository, RecordingRecord,
    RecordingRepository, SummaryRecord, SummaryRepository,
};
use crate::error::{PipelineError, PipelineResult};
use crate::reconcile::{StatusSnapshot, TranscriptSnapshot};
use crate::search::{self, TranscriptMatch};
use crate::summary::to_summary;
use crate::validation::{require_meeting_id, require_uuid_meeting_id};

/// Everything a client needs to render one meeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingStatusView {
    pub meeting: MeetingRecord,
    pub recordings: Vec<RecordingRecord>,
    pub summary: Option<SummaryRecord>,
    pub action_items: Vec<ActionItemRecord>,
}

impl MeetingStatusView {
    /// Reduce the view to the fields the editing session tracks. The
    /// transcript comes from the newest recording that has one.
    pub fn snapshot(&self) -> StatusSnapshot {
        let transcript = self.recordings.iter().find_map(|recording| {
            recording.transcript_text.as_ref().map(|text| TranscriptSnapshot {
                recording_id: recording.id.clone(),
                text: text.clone(),
            })
        });

        let summary = self.summary.as_ref().map(|row| {
            to_summary(
                row.overview.as_deref(),
                row.decisions.as_deref(),
                row.discussions.as_deref(),
                &self.action_items,
            )
        });

        StatusSnapshot {
            meeting_id: self.meeting.id.clone(),
            transcript,
            summary,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingWithRecordings {
    #[serde(flatten)]
    pub meeting: MeetingRecord,
    pub recordings: Vec<RecordingRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingMatches {
    pub recording_id: String,
    pub matches: Vec<TranscriptMatch>,
}

impl MeetingService {
    pub async fn status(
        &self,
        meeting_id: Option<&str>,
        recording_id: Option<&str>,
    ) -> PipelineResult<MeetingStatusView> {
        let meeting_id = require_uuid_meeting_id(meeting_id)?;
        let recording_id = recording_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string);

        let view = self
            .with_db("Failed to load meeting status", move |conn| {
                let Some(meeting) = MeetingRepository::get(conn, &meeting_id)? else {
                    return Ok(None);
                };

                let recordings = match recording_id {
                    Some(id) => RecordingRepository::latest(conn, &meeting_id, Some(&id))?
                        .into_iter()
                        .collect(),
                    None => RecordingRepository::list_for_meeting(
                        conn,
                        &meeting_id,
                        Some(STATUS_RECORDING_LIMIT),
                    )?,
                };

                Ok(Some(MeetingStatusView {
                    meeting,
                    recordings,
                    summary: SummaryRepository::get(conn, &meeting_id)?,
                    action_items: ActionItemRepository::list(conn, &meeting_id)?,
                }))
            })
            .await?;

        view.ok_or_else(|| PipelineError::not_found("Meeting not found."))
    }

    /// Newest meetings, each with all of its recordings.
    pub async fn list_meetings(&self, limit: usize) -> PipelineResult<Vec<MeetingWithRecordings>> {
        self.with_db("Failed to list meetings", move |conn| {
            MeetingRepository::list(conn, limit)?
                .into_iter()
                .map(|meeting| {
                    let recordings = RecordingRepository::list_for_meeting(conn, &meeting.id, None)?;
                    Ok::<_, anyhow::Error>(MeetingWithRecordings { meeting, recordings })
                })
                .collect()
        })
        .await
    }

    /// Literal, case-insensitive matches of `term` in every transcript of
    /// a meeting. Recordings without a match are left out.
    pub async fn search_transcripts(
        &self,
        meeting_id: Option<&str>,
        term: &str,
    ) -> PipelineResult<Vec<RecordingMatches>> {
        let meeting_id = require_meeting_id(meeting_id)?;
        let recordings = self
            .with_db("Failed to load transcripts", move |conn| {
                RecordingRepository::list_for_meeting(conn, &meeting_id, None)
            })
            .await?;

        Ok(recordings
            .into_iter()
            .filter_map(|recording| {
                let text = recording.transcript_text?;
                let matches = search::transcript_matches(&text, term);
                (!matches.is_empty()).then_some(RecordingMatches {
                    recording_id: recording.id,
                    matches,
                })
            })
            .collect())
    }
}
