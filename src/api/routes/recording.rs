//! Upload, transcription and transcript edit endpoints.

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Multipart, State},
    response::Json,
    routing::{post, put},
    Router,
};
use tracing::info;

use super::{json_body, AppState};
use crate::api::error::{ApiError, ApiResult};
use crate::pipeline::{TranscribeOutcome, TranscribeRequest, TranscriptSaved, TranscriptUpdate, UploadOutcome};

/// Largest accepted audio upload.
pub const MAX_UPLOAD_BYTES: usize = 200 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/upload",
            post(upload).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/api/transcribe", post(transcribe))
        .route("/api/transcript", put(save_transcript))
        .with_state(state)
}

/// POST /api/upload - multipart `file` and `meetingId`.
async fn upload(State(service): State<AppState>, mut multipart: Multipart) -> ApiResult<Json<UploadOutcome>> {
    let mut meeting_id: Option<String> = None;
    let mut file_name: Option<String> = None;
    let mut bytes: Vec<u8> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                file_name = field.file_name().map(str::to_string);
                bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read file: {}", e)))?
                    .to_vec();
            }
            Some("meetingId") => {
                meeting_id = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::bad_request(format!("Invalid meetingId: {}", e)))?,
                );
            }
            _ => {}
        }
    }

    info!("Upload received: {} bytes", bytes.len());
    let outcome = service
        .upload(meeting_id.as_deref(), file_name.as_deref(), bytes)
        .await?;
    Ok(Json(outcome))
}

/// POST /api/transcribe
async fn transcribe(
    State(service): State<AppState>,
    body: Result<Json<TranscribeRequest>, JsonRejection>,
) -> ApiResult<Json<TranscribeOutcome>> {
    let request = json_body(body)?;
    Ok(Json(service.transcribe(request).await?))
}

/// PUT /api/transcript
async fn save_transcript(
    State(service): State<AppState>,
    body: Result<Json<TranscriptUpdate>, JsonRejection>,
) -> ApiResult<Json<TranscriptSaved>> {
    let update = json_body(body)?;
    Ok(Json(service.save_transcript(update).await?))
}
