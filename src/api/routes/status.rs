//! Meeting status, history and transcript search.

use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::AppState;
use crate::api::error::ApiResult;
use crate::pipeline::{MeetingStatusView, MEETING_PAGE_SIZE};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusQuery {
    pub meeting_id: Option<String>,
    pub recording_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub meeting_id: Option<String>,
    /// Search term
    pub q: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/status", get(status))
        .route("/api/meetings", get(list_meetings))
        .route("/api/search", get(search))
        .with_state(state)
}

/// GET /api/status?meetingId=&recordingId=
async fn status(
    State(service): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> ApiResult<Json<MeetingStatusView>> {
    let view = service
        .status(query.meeting_id.as_deref(), query.recording_id.as_deref())
        .await?;
    Ok(Json(view))
}

/// GET /api/meetings - newest meetings with their recordings.
async fn list_meetings(State(service): State<AppState>) -> ApiResult<Json<Value>> {
    let meetings = service.list_meetings(MEETING_PAGE_SIZE).await?;
    Ok(Json(json!({ "meetings": meetings })))
}

/// GET /api/search?meetingId=&q=
async fn search(
    State(service): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Value>> {
    let term = query.q.unwrap_or_default();
    let results = service
        .search_transcripts(query.meeting_id.as_deref(), &term)
        .await?;
    Ok(Json(json!({ "results": results })))
}
