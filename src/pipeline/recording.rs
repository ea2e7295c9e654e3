//! Upload, transcription and manual transcript edits.

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::MeetingService;
use crate::db::{MeetingRepository, RecordingRepository};
use crate::error::{PipelineError, PipelineResult};
use crate::meeting::ProcessingStatus;
use crate::storage;
use crate::validation::{require_meeting_id, require_uuid_meeting_id};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadOutcome {
    pub meeting_id: String,
    pub recording_id: String,
    pub path: String,
    pub public_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranscribeRequest {
    pub meeting_id: Option<String>,
    pub recording_id: Option<String>,
    pub storage_path: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscribeOutcome {
    pub meeting_id: String,
    pub recording_id: String,
    pub transcript_text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranscriptUpdate {
    pub meeting_id: Option<String>,
    pub recording_id: Option<String>,
    pub transcript: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptSaved {
    pub recording_id: String,
    pub meeting_id: String,
    pub transcript: String,
}

impl MeetingService {
    /// Store an uploaded audio file and register it as the meeting's newest
    /// recording. The meeting row is created on first upload.
    pub async fn upload(
        &self,
        meeting_id: Option<&str>,
        file_name: Option<&str>,
        bytes: Vec<u8>,
    ) -> PipelineResult<UploadOutcome> {
        let meeting_id = require_uuid_meeting_id(meeting_id)?;
        if bytes.is_empty() {
            return Err(PipelineError::invalid("file is required."));
        }

        let key = storage::object_key(&meeting_id, file_name);
        self.store
            .put(&key, bytes)
            .await
            .map_err(PipelineError::storage("Upload failed"))?;

        let recording_id = {
            let meeting_id = meeting_id.clone();
            let key = key.clone();
            self.with_db("Failed to register recording", move |conn| {
                MeetingRepository::upsert_uploaded(conn, &meeting_id)?;
                RecordingRepository::insert(conn, &meeting_id, &key)
            })
            .await?
        };

        info!("Stored recording {} for meeting {}", recording_id, meeting_id);

        Ok(UploadOutcome {
            public_url: self.store.public_path(&key),
            meeting_id,
            recording_id,
            path: key,
        })
    }

    /// Run speech-to-text over a stored recording. Without an explicit
    /// recording the meeting's newest one is used.
    pub async fn transcribe(&self, request: TranscribeRequest) -> PipelineResult<TranscribeOutcome> {
        let meeting_id = require_meeting_id(request.meeting_id.as_deref())?;

        let (recording_id, storage_path) = match (request.recording_id, request.storage_path) {
            (Some(recording_id), Some(storage_path)) => {
                let lookup_recording = recording_id.clone();
                let recording = self
                    .with_db("Failed to load recording", move |conn| {
                        RecordingRepository::get(conn, &lookup_recording)
                    })
                    .await?
                    .ok_or_else(|| PipelineError::not_found("Recording not found."))?;
                if recording.meeting_id != meeting_id {
                    return Err(PipelineError::invalid("Recording does not belong to meeting."));
                }
                (recording_id, Some(storage_path))
            }
            (recording_id, storage_path) => {
                let lookup_meeting = meeting_id.clone();
                let lookup_recording = recording_id.clone();
                let recording = self
                    .with_db("Failed to load recording", move |conn| {
                        RecordingRepository::latest(conn, &lookup_meeting, lookup_recording.as_deref())
                    })
                    .await?
                    .ok_or_else(|| PipelineError::not_found("No recording found for meeting."))?;
                (recording.id, storage_path.or(recording.storage_path))
            }
        };

        let storage_path = storage_path
            .filter(|path| !path.trim().is_empty())
            .ok_or_else(|| PipelineError::invalid("Recording has no storage path."))?;

        let audio = self
            .store
            .get(&storage_path)
            .await
            .map_err(PipelineError::storage("Failed to download recording"))?;

        let transcript = self
            .transcriber
            .transcribe(audio, storage::file_name(&storage_path), request.language.as_deref())
            .await
            .map_err(|e| {
                error!("[transcribe] {} failed: {:#}", self.transcriber.name(), e);
                PipelineError::upstream("Transcription failed")(e)
            })?;

        {
            let meeting_id = meeting_id.clone();
            let recording_id = recording_id.clone();
            let transcript = transcript.clone();
            self.with_db("Failed to store transcript", move |conn| {
                if RecordingRepository::set_transcript(conn, &recording_id, &transcript)? == 0 {
                    return Ok(Err(PipelineError::not_found("Recording not found.")));
                }
                MeetingRepository::update_status(conn, &meeting_id, ProcessingStatus::Transcribed)?;
                Ok(Ok(()))
            })
            .await??;
        }

        info!("Transcribed recording {} ({} chars)", recording_id, transcript.len());

        Ok(TranscribeOutcome {
            meeting_id,
            recording_id,
            transcript_text: transcript,
        })
    }

    /// Replace a recording's transcript with a hand-edited one.
    pub async fn save_transcript(&self, update: TranscriptUpdate) -> PipelineResult<TranscriptSaved> {
        let recording_id = update
            .recording_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| PipelineError::invalid("recordingId is required."))?;
        let transcript = update
            .transcript
            .ok_or_else(|| PipelineError::invalid("transcript is required."))?;

        let requested_meeting = update.meeting_id.filter(|id| !id.trim().is_empty());
        let meeting_id = {
            let recording_id = recording_id.clone();
            let transcript = transcript.clone();
            self.with_db("Failed to save transcript", move |conn| {
                let Some(recording) = RecordingRepository::get(conn, &recording_id)? else {
                    return Ok(Err(PipelineError::not_found("Recording not found.")));
                };
                if let Some(requested) = requested_meeting {
                    if requested != recording.meeting_id {
                        return Ok(Err(PipelineError::invalid(
                            "Recording does not belong to meeting.",
                        )));
                    }
                }

                RecordingRepository::set_transcript(conn, &recording_id, &transcript)?;
                MeetingRepository::update_status(conn, &recording.meeting_id, ProcessingStatus::Transcribed)?;
                Ok(Ok(recording.meeting_id))
            })
            .await??
        };

        info!("Saved edited transcript for recording {}", recording_id);

        Ok(TranscriptSaved {
            recording_id,
            meeting_id,
            transcript,
        })
    }
}
