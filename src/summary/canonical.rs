//! Canonical summary value and its conversions to and from stored fields.

use serde::{Deserialize, Serialize};

use super::point::{normalize, SummaryPoint};
use crate::db::action_items::ActionItemRecord;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionItem {
    pub description: String,
    pub assignee: String,
    pub due_date: Option<String>,
    /// Fraction in `[0, 1]`.
    pub confidence: f64,
}

impl ActionItem {
    pub fn new(
        description: impl Into<String>,
        assignee: impl Into<String>,
        due_date: Option<&str>,
        confidence: f64,
    ) -> Self {
        Self {
            description: description.into(),
            assignee: assignee.into(),
            due_date: due_date.map(str::to_string),
            confidence,
        }
    }
}

impl From<&ActionItemRecord> for ActionItem {
    fn from(record: &ActionItemRecord) -> Self {
        Self {
            description: record.description.clone().unwrap_or_default(),
            assignee: record.assignee.clone().unwrap_or_default(),
            due_date: record.due_date.clone(),
            confidence: record.confidence.unwrap_or(0.0),
        }
    }
}

/// Summary of one meeting in its in-memory form.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryResult {
    pub overview: String,
    pub decisions: Vec<SummaryPoint>,
    pub discussions: Vec<SummaryPoint>,
    pub action_items: Vec<ActionItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagram_summary: Option<String>,
}

impl SummaryResult {
    pub fn is_empty(&self) -> bool {
        !self.has_text() && self.action_items.is_empty()
    }

    /// True when the summary row itself carries content. Action items alone
    /// do not count.
    pub fn has_text(&self) -> bool {
        !self.overview.trim().is_empty() || !self.decisions.is_empty() || !self.discussions.is_empty()
    }
}

/// The three text columns of a summary row.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PersistedSummary {
    pub overview: String,
    pub decisions: String,
    pub discussions: String,
}

/// Build the canonical summary from stored columns and action-item rows.
pub fn to_summary(
    overview: Option<&str>,
    decisions: Option<&str>,
    discussions: Option<&str>,
    action_items: &[ActionItemRecord],
) -> SummaryResult {
    SummaryResult {
        overview: overview.unwrap_or_default().to_string(),
        decisions: normalize(decisions),
        discussions: normalize(discussions),
        action_items: action_items.iter().map(ActionItem::from).collect(),
        diagram_summary: None,
    }
}

/// Encode the summary columns. Action items are written separately.
pub fn to_persisted(summary: &SummaryResult) -> PersistedSummary {
    PersistedSummary {
        overview: summary.overview.clone(),
        decisions: join_points(&summary.decisions),
        discussions: join_points(&summary.discussions),
    }
}

fn join_points(points: &[SummaryPoint]) -> String {
    points
        .iter()
        .map(SummaryPoint::render)
        .collect::<Vec<_>>()
        .join("\n")
}
