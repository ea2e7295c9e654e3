//! API route modules.

pub mod admin;
pub mod recording;
pub mod share;
pub mod status;
pub mod summary;

use axum::{extract::rejection::JsonRejection, Json, Router};
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::pipeline::MeetingService;

/// State shared by every handler.
pub type AppState = Arc<MeetingService>;

/// All `/api` routes.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .merge(recording::router(state.clone()))
        .merge(summary::router(state.clone()))
        .merge(status::router(state.clone()))
        .merge(share::router(state.clone()))
        .merge(admin::router(state))
}

/// Unwrap a JSON body, reporting malformed input in the API's error shape.
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::bad_request(format!("Invalid request body: {}", rejection.body_text())))
}
