//! Client-side edit reconciliation for one meeting at a time.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

pub mod poller;
pub mod state;

pub use poller::{spawn_session, Command, SessionHandle, POLL_INTERVAL};
pub use state::{
    Event, Field, FieldState, Outcome, SaveRequest, SessionState, StatusSnapshot, TranscriptSnapshot,
};

use crate::pipeline::MeetingStatusView;

/// Server operations a session depends on.
#[async_trait]
pub trait SessionClient: Send + Sync {
    async fn fetch_status(&self, meeting_id: &str) -> Result<StatusSnapshot>;
    async fn save(&self, request: &SaveRequest) -> Result<()>;
}

/// [`SessionClient`] over the service's HTTP API.
pub struct HttpSessionClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSessionClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Turn a non-success response into an error carrying the server's
/// `message` field when it has one.
async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|value| value.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or(body);
    bail!("HTTP {}: {}", status.as_u16(), message)
}

#[async_trait]
impl SessionClient for HttpSessionClient {
    async fn fetch_status(&self, meeting_id: &str) -> Result<StatusSnapshot> {
        debug!("Fetching status for {}", meeting_id);
        let response = self
            .client
            .get(self.url("/api/status"))
            .query(&[("meetingId", meeting_id)])
            .send()
            .await
            .context("Failed to reach status endpoint")?;

        let view: MeetingStatusView = check(response)
            .await?
            .json()
            .await
            .context("Failed to parse status response")?;
        Ok(view.snapshot())
    }

    async fn save(&self, request: &SaveRequest) -> Result<()> {
        let builder = match request {
            SaveRequest::Transcript {
                meeting_id,
                recording_id,
                text,
            } => self.client.put(self.url("/api/transcript")).json(&json!({
                "meetingId": meeting_id,
                "recordingId": recording_id,
                "transcript": text,
            })),
            SaveRequest::Summary { meeting_id, summary } => {
                self.client.put(self.url("/api/summary")).json(&json!({
                    "meetingId": meeting_id,
                    "summary": summary,
                }))
            }
        };

        let response = builder
            .send()
            .await
            .with_context(|| format!("Failed to save {}", request.field().as_str()))?;
        check(response).await?;
        Ok(())
    }
}
