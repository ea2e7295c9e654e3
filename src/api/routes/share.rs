//! Share link management and the public share view.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{json_body, AppState};
use crate::api::error::ApiResult;
use crate::share::SharePayload;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareQuery {
    pub meeting_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateShareRequest {
    pub meeting_id: Option<String>,
    pub expires_in_hours: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DisableShareRequest {
    pub token: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/share",
            get(list_links).post(create_link).delete(disable_link),
        )
        .route("/api/share/:token", get(shared_meeting))
        .with_state(state)
}

/// GET /api/share?meetingId=
async fn list_links(
    State(service): State<AppState>,
    Query(query): Query<ShareQuery>,
) -> ApiResult<Json<Value>> {
    let links = service.list_share_links(query.meeting_id.as_deref()).await?;
    Ok(Json(json!({ "links": links })))
}

/// POST /api/share
async fn create_link(
    State(service): State<AppState>,
    body: Result<Json<CreateShareRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let request = json_body(body)?;
    let link = service
        .create_share_link(request.meeting_id.as_deref(), request.expires_in_hours)
        .await?;
    Ok(Json(json!({ "link": link })))
}

/// DELETE /api/share
async fn disable_link(
    State(service): State<AppState>,
    body: Result<Json<DisableShareRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let request = json_body(body)?;
    service.disable_share_link(request.token.as_deref()).await?;
    Ok(Json(json!({ "success": true })))
}

/// GET /api/share/:token - read-only meeting view for link holders.
async fn shared_meeting(
    State(service): State<AppState>,
    Path(token): Path<String>,
) -> ApiResult<Json<SharePayload>> {
    Ok(Json(service.share_payload(&token).await?))
}
