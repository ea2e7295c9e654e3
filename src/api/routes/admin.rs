//! Maintenance endpoints.

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap},
    response::Json,
    routing::post,
    Router,
};
use chrono::Utc;
use tracing::{info, warn};

use super::AppState;
use crate::api::error::{ApiError, ApiResult};
use crate::pipeline::CleanupReport;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/admin/cleanup", post(cleanup).get(cleanup))
        .with_state(state)
}

/// POST|GET /api/admin/cleanup - retention sweep, usually from a scheduler.
async fn cleanup(State(service): State<AppState>, headers: HeaderMap) -> ApiResult<Json<CleanupReport>> {
    let authorization = headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok());
    if !service.authorize_cleanup(authorization) {
        warn!("[cleanup] rejected unauthorized request");
        return Err(ApiError::unauthorized("Unauthorized"));
    }

    let report = service.cleanup(Utc::now()).await?;
    info!("[cleanup] removed {} recordings", report.removed_recordings);
    Ok(Json(report))
}
