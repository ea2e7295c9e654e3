//! REST API server for minutegraph.
//!
//! Provides HTTP endpoints for:
//! - Audio upload and transcription
//! - Summaries and diagrams
//! - Meeting status and history
//! - Share links
//! - Retention cleanup

pub mod error;
pub mod routes;

use crate::config::Config;
use crate::pipeline::MeetingService;
use anyhow::{Context, Result};
use axum::{response::Json, routing::get, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::info;

pub use routes::AppState;

pub struct ApiServer {
    address: String,
    service: AppState,
}

impl ApiServer {
    pub fn new(service: Arc<MeetingService>, config: &Config) -> Self {
        Self {
            address: config.bind_address(),
            service,
        }
    }

    pub async fn start(self) -> Result<()> {
        let app = router(self.service);

        let listener = tokio::net::TcpListener::bind(&self.address)
            .await
            .with_context(|| format!("Failed to bind {}", self.address))?;

        info!("API server listening on http://{}", self.address);
        info!("Endpoints:");
        info!("  GET    /                    - Service info");
        info!("  POST   /api/upload          - Upload meeting audio");
        info!("  POST   /api/transcribe      - Transcribe a recording");
        info!("  PUT    /api/transcript      - Save an edited transcript");
        info!("  POST   /api/summary         - Summarize a transcript");
        info!("  PUT    /api/summary         - Save an edited summary");
        info!("  POST   /api/diagram         - Build the summary diagram");
        info!("  GET    /api/status          - Meeting status");
        info!("  GET    /api/meetings        - Recent meetings");
        info!("  GET    /api/search          - Search transcripts");
        info!("  GET    /api/share           - List share links");
        info!("  POST   /api/share           - Create a share link");
        info!("  DELETE /api/share           - Disable a share link");
        info!("  GET    /api/share/:token    - Shared meeting view");
        info!("  POST   /api/admin/cleanup   - Run retention cleanup");

        axum::serve(listener, app).await?;

        Ok(())
    }
}

/// Full application router.
pub fn router(service: AppState) -> Router {
    Router::new()
        .route("/", get(status))
        .merge(routes::api_router(service))
        .layer(ServiceBuilder::new())
}

async fn status() -> Json<Value> {
    Json(json!({
        "service": "minutegraph",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}
