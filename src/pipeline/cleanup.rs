//! Retention sweep for old recordings and diagrams.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::MeetingService;
use crate::db::{timestamp, DiagramRepository, RecordingRepository};
use crate::error::{PipelineError, PipelineResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupReport {
    pub removed_recordings: usize,
    pub removed_storage_objects: usize,
    pub removed_diagrams: usize,
    pub cutoff: String,
}

impl MeetingService {
    /// Whether an `Authorization` header value may trigger a cleanup. With
    /// no secret configured the endpoint is open.
    pub fn authorize_cleanup(&self, authorization: Option<&str>) -> bool {
        match self.retention.cron_secret.as_deref() {
            None => true,
            Some(secret) => authorization
                .and_then(|value| value.strip_prefix("Bearer "))
                .map(|token| token.trim() == secret)
                .unwrap_or(false),
        }
    }

    /// Delete recordings and diagrams older than the retention window, at
    /// most one batch of each. Audio objects that cannot be removed are
    /// logged and their rows are deleted anyway.
    pub async fn cleanup(&self, now: DateTime<Utc>) -> PipelineResult<CleanupReport> {
        let days = i64::from(self.retention.file_retention_days);
        let cutoff = now
            .checked_sub_signed(Duration::days(days))
            .ok_or_else(|| PipelineError::invalid("Retention window is out of range."))?;
        let cutoff = timestamp(cutoff);
        let batch = self.retention.max_batch;

        let expired = {
            let cutoff = cutoff.clone();
            self.with_db("Failed to find expired recordings", move |conn| {
                RecordingRepository::created_before(conn, &cutoff, batch)
            })
            .await?
        };

        let paths: Vec<String> = expired
            .iter()
            .filter_map(|recording| recording.storage_path.clone())
            .filter(|path| !path.is_empty())
            .collect();

        let removed_storage_objects = if paths.is_empty() {
            0
        } else {
            match self.store.remove(&paths).await {
                Ok(removed) => removed,
                Err(e) => {
                    error!("[cleanup] failed to remove stored audio: {:#}", e);
                    0
                }
            }
        };

        let ids: Vec<String> = expired.into_iter().map(|recording| recording.id).collect();
        let (removed_recordings, removed_diagrams) = {
            let cutoff = cutoff.clone();
            self.with_db("Failed to delete expired rows", move |conn| {
                let removed_recordings = RecordingRepository::delete_many(conn, &ids)?;
                let diagrams = DiagramRepository::updated_before(conn, &cutoff, batch)?;
                let removed_diagrams = DiagramRepository::delete_many(conn, &diagrams)?;
                Ok((removed_recordings, removed_diagrams))
            })
            .await?
        };

        info!(
            "Cleanup before {}: {} recordings, {} objects, {} diagrams",
            cutoff, removed_recordings, removed_storage_objects, removed_diagrams
        );

        Ok(CleanupReport {
            removed_recordings,
            removed_storage_objects,
            removed_diagrams,
            cutoff,
        })
    }
}
