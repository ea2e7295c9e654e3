//! Read-only share links for a meeting.
//!
//! A link is addressed by an unguessable token. Disabled links and links
//! past their expiry resolve to "not found" so a token's state is never
//! revealed to the holder.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::{
    timestamp, ActionItemRecord, ActionItemRepository, DiagramRecord, DiagramRepository,
    MeetingRecord, MeetingRepository, ShareLinkRecord, ShareLinkRepository, SummaryRepository,
};
use crate::error::{PipelineError, PipelineResult};
use crate::pipeline::MeetingService;
use crate::summary::SummaryResult;
use crate::validation::require_uuid_meeting_id;

/// Longest expiry a caller may request.
pub const MAX_EXPIRY_HOURS: f64 = 24.0 * 365.0;

/// 32 hex characters from a v4 UUID.
pub fn generate_token() -> String {
    Uuid::new_v4().simple().to_string()
}

pub fn share_path(token: &str) -> String {
    format!("/share/{}", token)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareLinkView {
    #[serde(flatten)]
    pub link: ShareLinkRecord,
    pub share_path: String,
    pub is_expired: bool,
}

impl ShareLinkView {
    fn at(link: ShareLinkRecord, now: chrono::DateTime<Utc>) -> Self {
        Self {
            share_path: share_path(&link.token),
            is_expired: link.is_expired_at(now),
            link,
        }
    }
}

/// What a share-link holder sees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharePayload {
    pub share: ShareLinkView,
    pub meeting: MeetingRecord,
    pub summary: Option<SummaryResult>,
    pub action_items: Vec<ActionItemRecord>,
    pub diagram: Option<DiagramRecord>,
}

impl MeetingService {
    pub async fn list_share_links(&self, meeting_id: Option<&str>) -> PipelineResult<Vec<ShareLinkView>> {
        let meeting_id = require_uuid_meeting_id(meeting_id)?;
        let links = self
            .with_db("Failed to list share links", move |conn| {
                ShareLinkRepository::list_for_meeting(conn, &meeting_id)
            })
            .await?;

        let now = Utc::now();
        Ok(links.into_iter().map(|link| ShareLinkView::at(link, now)).collect())
    }

    /// Create a link for an existing meeting. Missing or non-positive
    /// `expires_in_hours` falls back to the configured default; larger
    /// values are capped at [`MAX_EXPIRY_HOURS`].
    pub async fn create_share_link(
        &self,
        meeting_id: Option<&str>,
        expires_in_hours: Option<f64>,
    ) -> PipelineResult<ShareLinkView> {
        let meeting_id = require_uuid_meeting_id(meeting_id)?;
        let hours = expires_in_hours
            .filter(|hours| hours.is_finite() && *hours > 0.0)
            .map(|hours| hours.min(MAX_EXPIRY_HOURS))
            .unwrap_or_else(|| f64::from(self.share.default_expiry_hours));

        let now = Utc::now();
        let expires_at = timestamp(now + Duration::seconds((hours * 3600.0).round() as i64));
        let token = generate_token();

        let link = self
            .with_db("Failed to create share link", move |conn| {
                if MeetingRepository::get(conn, &meeting_id)?.is_none() {
                    return Ok(None);
                }
                ShareLinkRepository::insert(conn, &meeting_id, &token, Some(&expires_at)).map(Some)
            })
            .await?
            .ok_or_else(|| PipelineError::not_found("Meeting not found."))?;

        info!("Created share link for meeting {}", link.meeting_id);
        Ok(ShareLinkView::at(link, now))
    }

    pub async fn disable_share_link(&self, token: Option<&str>) -> PipelineResult<()> {
        let token = token
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .ok_or_else(|| PipelineError::invalid("token is required."))?;

        let disabled = self
            .with_db("Failed to disable share link", move |conn| {
                ShareLinkRepository::disable(conn, &token)
            })
            .await?;

        if disabled == 0 {
            return Err(PipelineError::not_found("Share link not found."));
        }
        info!("Disabled share link");
        Ok(())
    }

    /// Resolve a token to its meeting content and record the access.
    pub async fn share_payload(&self, token: &str) -> PipelineResult<SharePayload> {
        let token = token.trim().to_string();
        if token.is_empty() {
            return Err(PipelineError::not_found("Share link not found."));
        }

        let now = Utc::now();
        let accessed_at = timestamp(now);

        let payload = self
            .with_db("Failed to load shared meeting", move |conn| {
                let Some(link) = ShareLinkRepository::find_enabled(conn, &token)? else {
                    return Ok(None);
                };
                if link.is_expired_at(now) {
                    return Ok(None);
                }
                let Some(meeting) = MeetingRepository::get(conn, &link.meeting_id)? else {
                    warn!("[share] link {} points at a missing meeting", link.id);
                    return Ok(None);
                };

                ShareLinkRepository::touch(conn, &link.id, &accessed_at)?;

                Ok(Some(SharePayload {
                    summary: SummaryRepository::load(conn, &meeting.id)?,
                    action_items: ActionItemRepository::list(conn, &meeting.id)?,
                    diagram: DiagramRepository::latest(conn, &meeting.id)?,
                    share: ShareLinkView::at(
                        ShareLinkRecord {
                            last_accessed_at: Some(accessed_at.clone()),
                            ..link
                        },
                        now,
                    ),
                    meeting,
                }))
            })
            .await?;

        payload.ok_or_else(|| PipelineError::not_found("Share link not found."))
    }
}
