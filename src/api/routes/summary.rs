//! Summary and diagram endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
    routing::post,
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{json_body, AppState};
use crate::api::error::ApiResult;
use crate::pipeline::{DiagramOutcome, SummarizeRequest};
use crate::summary::SummaryResult;

/// Body of `PUT /api/summary` and `POST /api/diagram`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SummaryBody {
    pub meeting_id: Option<String>,
    pub summary: Option<Value>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/summary", post(summarize).put(save_summary))
        .route("/api/diagram", post(build_diagram))
        .with_state(state)
}

/// POST /api/summary - generate and store a summary.
async fn summarize(
    State(service): State<AppState>,
    body: Result<Json<SummarizeRequest>, JsonRejection>,
) -> ApiResult<Json<SummaryResult>> {
    let request = json_body(body)?;
    Ok(Json(service.summarize(request).await?))
}

/// PUT /api/summary - store a hand-edited summary.
async fn save_summary(
    State(service): State<AppState>,
    body: Result<Json<SummaryBody>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let body = json_body(body)?;
    let raw = body.summary.unwrap_or(Value::Null);
    let summary = service
        .save_edited_summary(body.meeting_id.as_deref(), &raw)
        .await?;
    Ok(Json(json!({ "summary": summary })))
}

/// POST /api/diagram
async fn build_diagram(
    State(service): State<AppState>,
    body: Result<Json<SummaryBody>, JsonRejection>,
) -> ApiResult<Json<DiagramOutcome>> {
    let body = json_body(body)?;
    let outcome = service
        .build_diagram(body.meeting_id.as_deref(), body.summary.as_ref())
        .await?;
    Ok(Json(outcome))
}
