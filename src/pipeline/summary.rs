//! Summarization, edited-summary saves and diagram generation.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};

use super::MeetingService;
use crate::db::{
    DiagramRepository, MeetingRepository, RecordingRepository, SummaryRepository,
};
use crate::diagram;
use crate::error::{PipelineError, PipelineResult};
use crate::meeting::ProcessingStatus;
use crate::summary::{sanitize_edited_summary, SummaryResult};
use crate::validation::require_meeting_id;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SummarizeRequest {
    pub meeting_id: Option<String>,
    pub recording_id: Option<String>,
    pub transcript: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramOutcome {
    pub meeting_id: String,
    pub mermaid: String,
}

impl MeetingService {
    /// Summarize a transcript and store the result. Without an explicit
    /// transcript the newest transcribed recording is used.
    pub async fn summarize(&self, request: SummarizeRequest) -> PipelineResult<SummaryResult> {
        let meeting_id = require_meeting_id(request.meeting_id.as_deref())?;

        let provided = request.transcript.filter(|text| !text.trim().is_empty());
        let (transcript, recording_id) = match provided {
            Some(text) => (text, request.recording_id),
            None => {
                let lookup_meeting = meeting_id.clone();
                let lookup_recording = request.recording_id.clone();
                let recording = self
                    .with_db("Failed to load transcript", move |conn| {
                        RecordingRepository::latest_transcribed(
                            conn,
                            &lookup_meeting,
                            lookup_recording.as_deref(),
                        )
                    })
                    .await?;

                match recording.and_then(|r| r.transcript_text.map(|text| (text, r.id))) {
                    Some((text, id)) => (text, Some(id)),
                    None => return Err(PipelineError::invalid("No transcript available to summarize.")),
                }
            }
        };

        let summary = self
            .summarizer
            .summarize(&transcript, &meeting_id, request.language.as_deref())
            .await
            .map_err(|e| {
                error!("[summary] summarizer failed for {}: {:#}", meeting_id, e);
                PipelineError::upstream("Summarization failed")(e)
            })?;

        {
            let owned = meeting_id.clone();
            let summary = summary.clone();
            self.with_db("Failed to save summary", move |conn| {
                if let Err(e) = SummaryRepository::save(conn, &owned, &summary) {
                    return Ok(Err(e));
                }
                if let Some(recording_id) = recording_id {
                    RecordingRepository::update_status(conn, &recording_id, ProcessingStatus::Summarized)?;
                }
                MeetingRepository::update_status(conn, &owned, ProcessingStatus::Summarized)?;
                Ok(Ok(()))
            })
            .await?
            .map_err(|e| {
                error!("[summary] save for {} stopped at {}: {:#}", meeting_id, e.step, e.source);
                PipelineError::from(e)
            })?;
        }

        info!(
            "Summarized meeting {}: {} decisions, {} action items",
            meeting_id,
            summary.decisions.len(),
            summary.action_items.len()
        );

        Ok(summary)
    }

    /// Save a client-edited summary after sanitizing it. Returns the summary
    /// as it reads back from storage.
    pub async fn save_edited_summary(
        &self,
        meeting_id: Option<&str>,
        raw: &Value,
    ) -> PipelineResult<SummaryResult> {
        let meeting_id = require_meeting_id(meeting_id)?;
        let summary = sanitize_edited_summary(raw);

        let saved = {
            let owned = meeting_id.clone();
            self.with_db("Failed to save summary", move |conn| {
                if let Err(e) = SummaryRepository::save(conn, &owned, &summary) {
                    return Ok(Err(e));
                }
                Ok(Ok(SummaryRepository::load(conn, &owned)?))
            })
            .await?
            .map_err(|e| {
                error!("[summary] edited save for {} stopped at {}: {:#}", meeting_id, e.step, e.source);
                PipelineError::from(e)
            })?
        };

        info!("Saved edited summary for meeting {}", meeting_id);
        saved.ok_or_else(|| PipelineError::not_found("Summary not found."))
    }

    /// Canonical summary of a meeting, if one has been saved.
    pub async fn load_summary(&self, meeting_id: &str) -> PipelineResult<Option<SummaryResult>> {
        let meeting_id = meeting_id.to_string();
        self.with_db("Failed to load summary", move |conn| {
            SummaryRepository::load(conn, &meeting_id)
        })
        .await
    }

    /// Build the meeting's Mermaid diagram and store it. A summary in the
    /// request is sanitized and used as-is; otherwise the stored summary is
    /// rendered.
    pub async fn build_diagram(
        &self,
        meeting_id: Option<&str>,
        summary: Option<&Value>,
    ) -> PipelineResult<DiagramOutcome> {
        let meeting_id = require_meeting_id(meeting_id)?;

        let summary = match summary.filter(|value| !value.is_null()) {
            Some(raw) => sanitize_edited_summary(raw),
            None => self
                .load_summary(&meeting_id)
                .await?
                .ok_or_else(|| PipelineError::invalid("No saved summary found."))?,
        };

        if summary.is_empty() {
            warn!("[diagram] building diagram for {} from an empty summary", meeting_id);
        }

        let mermaid = diagram::build(&summary);
        {
            let meeting_id = meeting_id.clone();
            let mermaid = mermaid.clone();
            self.with_db("Failed to save diagram", move |conn| {
                DiagramRepository::upsert(conn, &meeting_id, &mermaid)
            })
            .await?;
        }

        info!("Built diagram for meeting {}", meeting_id);
        Ok(DiagramOutcome { meeting_id, mermaid })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::pipeline::test_support::*;
    use crate::pipeline::TranscribeRequest;
    use crate::summary::{ActionItem, SummaryPoint};
    use serde_json::json;

    fn sample() -> SummaryResult {
        SummaryResult {
            overview: "Launch sync".to_string(),
            decisions: vec![SummaryPoint::text("Adopt plan A")],
            discussions: vec![SummaryPoint::structured(Some("Budget"), Some("Tight"))],
            action_items: vec![ActionItem::new("Send recap", "Ana", None, 0.8)],
            diagram_summary: None,
        }
    }

    #[tokio::test]
    async fn test_summarize_with_explicit_transcript() {
        let h = harness_with(
            FakeTranscriber::returning("unused"),
            FakeSummarizer::returning(sample()),
            Config::default(),
        );

        let summary = h
            .service
            .summarize(SummarizeRequest {
                meeting_id: Some(MEETING.to_string()),
                transcript: Some("hello team".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(summary, sample());
        assert_eq!(h.summarizer.seen.lock().unwrap().as_slice(), ["hello team"]);

        let loaded = h.service.load_summary(MEETING).await.unwrap().unwrap();
        assert_eq!(loaded.overview, "Launch sync");
        assert_eq!(loaded.decisions, vec![SummaryPoint::text("Adopt plan A")]);
        assert_eq!(loaded.action_items.len(), 1);
    }

    #[tokio::test]
    async fn test_summarize_falls_back_to_stored_transcript() {
        let h = harness_with(
            FakeTranscriber::returning("stored words"),
            FakeSummarizer::returning(sample()),
            Config::default(),
        );
        h.service.upload(Some(MEETING), None, vec![1]).await.unwrap();
        h.service
            .transcribe(TranscribeRequest {
                meeting_id: Some(MEETING.to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        h.service
            .summarize(SummarizeRequest {
                meeting_id: Some(MEETING.to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(h.summarizer.seen.lock().unwrap().as_slice(), ["stored words"]);

        let (meeting, recordings) = h
            .service
            .database()
            .call(|conn| {
                Ok((
                    MeetingRepository::get(conn, MEETING)?,
                    RecordingRepository::list_for_meeting(conn, MEETING, None)?,
                ))
            })
            .await
            .unwrap();
        assert_eq!(meeting.unwrap().status, "summarized");
        assert_eq!(recordings[0].status, "summarized");
    }

    #[tokio::test]
    async fn test_summarize_without_transcript_is_rejected() {
        let h = harness();
        let err = h
            .service
            .summarize(SummarizeRequest {
                meeting_id: Some(MEETING.to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));
        assert!(h.summarizer.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_summarizer_failure_is_upstream() {
        let mut summarizer = FakeSummarizer::returning(sample());
        summarizer.fail = true;
        let h = harness_with(FakeTranscriber::returning("x"), summarizer, Config::default());

        let err = h
            .service
            .summarize(SummarizeRequest {
                meeting_id: Some(MEETING.to_string()),
                transcript: Some("text".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Upstream { .. }));
        assert!(h.service.load_summary(MEETING).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_edited_summary_sanitizes() {
        let h = harness();
        let saved = h
            .service
            .save_edited_summary(
                Some(MEETING),
                &json!({
                    "overview": "Edited",
                    "decisions": ["  Keep  ", ""],
                    "discussions": [],
                    "action_items": [
                        {"description": "Ship", "assignee": "Bo", "confidence": 7},
                        {"description": "   "}
                    ]
                }),
            )
            .await
            .unwrap();

        assert_eq!(saved.overview, "Edited");
        assert_eq!(saved.decisions, vec![SummaryPoint::text("Keep")]);
        assert_eq!(saved.action_items.len(), 1);
        assert_eq!(saved.action_items[0].confidence, 1.0);
    }

    #[tokio::test]
    async fn test_build_diagram_from_stored_summary() {
        let h = harness_with(
            FakeTranscriber::returning("x"),
            FakeSummarizer::returning(sample()),
            Config::default(),
        );

        let err = h.service.build_diagram(Some(MEETING), None).await.unwrap_err();
        assert_eq!(err.user_message(), "No saved summary found.");

        h.service
            .summarize(SummarizeRequest {
                meeting_id: Some(MEETING.to_string()),
                transcript: Some("text".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        let outcome = h.service.build_diagram(Some(MEETING), None).await.unwrap();
        assert!(outcome.mermaid.starts_with("graph TD"));
        assert!(outcome.mermaid.contains("Adopt plan A"));

        let stored = h
            .service
            .database()
            .call(|conn| DiagramRepository::latest(conn, MEETING))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.mermaid_source.as_deref(), Some(outcome.mermaid.as_str()));
    }

    #[tokio::test]
    async fn test_build_diagram_from_request_summary() {
        let h = harness();
        let outcome = h
            .service
            .build_diagram(
                Some(MEETING),
                Some(&json!({"overview": "", "decisions": ["Defer plan B"]})),
            )
            .await
            .unwrap();
        assert!(outcome.mermaid.contains("decision0(\"Defer plan B\")"));
    }
}
