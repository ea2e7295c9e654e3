//! Form representation of a summary while it is being edited.
//!
//! Points are flattened to strings and confidence is shown as a percentage.
//! Every edit returns a new value.

use serde::{Deserialize, Serialize};

use super::canonical::{ActionItem, SummaryResult};
use super::point::SummaryPoint;

/// Confidence given to a freshly added action item, in percent.
const NEW_ITEM_CONFIDENCE: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointSection {
    Decisions,
    Discussions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionField {
    Description,
    Assignee,
    DueDate,
    Confidence,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EditableActionItem {
    pub description: String,
    pub assignee: String,
    pub due_date: String,
    /// Percentage in `[0, 100]`.
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EditableSummary {
    pub overview: String,
    pub decisions: Vec<String>,
    pub discussions: Vec<String>,
    pub action_items: Vec<EditableActionItem>,
}

impl From<&SummaryResult> for EditableSummary {
    fn from(summary: &SummaryResult) -> Self {
        Self {
            overview: summary.overview.clone(),
            decisions: summary.decisions.iter().map(SummaryPoint::render).collect(),
            discussions: summary.discussions.iter().map(SummaryPoint::render).collect(),
            action_items: summary
                .action_items
                .iter()
                .map(|item| EditableActionItem {
                    description: item.description.clone(),
                    assignee: item.assignee.clone(),
                    due_date: item.due_date.clone().unwrap_or_default(),
                    confidence: (item.confidence * 100.0).round(),
                })
                .collect(),
        }
    }
}

impl EditableSummary {
    /// Convert back to canonical form: blank points and items without a
    /// description are dropped, confidence is scaled back to `[0, 1]`.
    pub fn to_summary(&self) -> SummaryResult {
        SummaryResult {
            overview: self.overview.clone(),
            decisions: non_blank_points(&self.decisions),
            discussions: non_blank_points(&self.discussions),
            action_items: self
                .action_items
                .iter()
                .map(|item| ActionItem {
                    description: item.description.trim().to_string(),
                    assignee: item.assignee.trim().to_string(),
                    due_date: Some(item.due_date.trim().to_string()).filter(|date| !date.is_empty()),
                    confidence: (item.confidence / 100.0).clamp(0.0, 1.0),
                })
                .filter(|item| !item.description.is_empty())
                .collect(),
            diagram_summary: None,
        }
    }

    pub fn with_overview(&self, overview: impl Into<String>) -> Self {
        Self {
            overview: overview.into(),
            ..self.clone()
        }
    }

    pub fn with_point(&self, section: PointSection, index: usize, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        if let Some(slot) = next.points_mut(section).get_mut(index) {
            *slot = value.into();
        }
        next
    }

    pub fn with_added_point(&self, section: PointSection) -> Self {
        let mut next = self.clone();
        next.points_mut(section).push(String::new());
        next
    }

    pub fn without_point(&self, section: PointSection, index: usize) -> Self {
        let mut next = self.clone();
        let points = next.points_mut(section);
        if index < points.len() {
            points.remove(index);
        }
        next
    }

    /// Set one action-item field from raw form input. Confidence input that
    /// does not parse becomes 0; parsed values are clamped to `[0, 100]`.
    pub fn with_action_field(&self, index: usize, field: ActionField, value: &str) -> Self {
        let mut next = self.clone();
        let Some(item) = next.action_items.get_mut(index) else {
            return next;
        };

        match field {
            ActionField::Description => item.description = value.to_string(),
            ActionField::Assignee => item.assignee = value.to_string(),
            ActionField::DueDate => item.due_date = value.to_string(),
            ActionField::Confidence => {
                item.confidence = value
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|number| number.is_finite())
                    .map(|number| number.clamp(0.0, 100.0))
                    .unwrap_or(0.0);
            }
        }
        next
    }

    pub fn with_added_action(&self) -> Self {
        let mut next = self.clone();
        next.action_items.push(EditableActionItem {
            confidence: NEW_ITEM_CONFIDENCE,
            ..Default::default()
        });
        next
    }

    pub fn without_action(&self, index: usize) -> Self {
        let mut next = self.clone();
        if index < next.action_items.len() {
            next.action_items.remove(index);
        }
        next
    }

    fn points_mut(&mut self, section: PointSection) -> &mut Vec<String> {
        match section {
            PointSection::Decisions => &mut self.decisions,
            PointSection::Discussions => &mut self.discussions,
        }
    }
}

fn non_blank_points(points: &[String]) -> Vec<SummaryPoint> {
    points
        .iter()
        .map(|point| point.trim())
        .filter(|point| !point.is_empty())
        .map(SummaryPoint::text)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SummaryResult {
        SummaryResult {
            overview: "Kickoff".to_string(),
            decisions: vec![SummaryPoint::structured(Some("Scope"), Some("MVP only"))],
            discussions: vec![SummaryPoint::text("Timeline")],
            action_items: vec![ActionItem::new("Book room", "Ana", None, 0.734)],
            diagram_summary: None,
        }
    }

    #[test]
    fn test_from_summary_scales_confidence() {
        let editable = EditableSummary::from(&sample());
        assert_eq!(editable.decisions, vec!["Scope: MVP only".to_string()]);
        assert_eq!(editable.action_items[0].confidence, 73.0);
        assert_eq!(editable.action_items[0].due_date, "");
    }

    #[test]
    fn test_to_summary_filters_and_clamps() {
        let editable = EditableSummary {
            overview: "o".to_string(),
            decisions: vec!["keep".to_string(), "  ".to_string()],
            discussions: vec![String::new()],
            action_items: vec![
                EditableActionItem {
                    description: " Task ".to_string(),
                    assignee: " Bo ".to_string(),
                    due_date: String::new(),
                    confidence: 250.0,
                },
                EditableActionItem {
                    description: "   ".to_string(),
                    ..Default::default()
                },
            ],
        };

        let summary = editable.to_summary();
        assert_eq!(summary.decisions, vec![SummaryPoint::text("keep")]);
        assert!(summary.discussions.is_empty());
        assert_eq!(summary.action_items, vec![ActionItem::new("Task", "Bo", None, 1.0)]);
    }

    #[test]
    fn test_point_edits_return_new_values() {
        let original = EditableSummary::from(&sample());
        let edited = original
            .with_added_point(PointSection::Decisions)
            .with_point(PointSection::Decisions, 1, "Second");

        assert_eq!(original.decisions.len(), 1);
        assert_eq!(edited.decisions, vec!["Scope: MVP only".to_string(), "Second".to_string()]);

        let removed = edited.without_point(PointSection::Decisions, 0);
        assert_eq!(removed.decisions, vec!["Second".to_string()]);

        // Out-of-range edits are no-ops.
        assert_eq!(removed.with_point(PointSection::Discussions, 9, "x"), removed);
        assert_eq!(removed.without_point(PointSection::Discussions, 9), removed);
    }

    #[test]
    fn test_action_field_edits() {
        let editable = EditableSummary::from(&sample()).with_added_action();
        assert_eq!(editable.action_items[1].confidence, 50.0);

        let edited = editable
            .with_action_field(1, ActionField::Description, "Send invite")
            .with_action_field(1, ActionField::Confidence, "140")
            .with_action_field(0, ActionField::Confidence, "abc")
            .with_action_field(0, ActionField::DueDate, "2024-07-01");

        assert_eq!(edited.action_items[1].description, "Send invite");
        assert_eq!(edited.action_items[1].confidence, 100.0);
        assert_eq!(edited.action_items[0].confidence, 0.0);
        assert_eq!(edited.action_items[0].due_date, "2024-07-01");

        let trimmed = edited.without_action(0);
        assert_eq!(trimmed.action_items.len(), 1);
        assert_eq!(trimmed.action_items[0].description, "Send invite");
    }

    #[test]
    fn test_to_summary_matches_sanitizer_on_whitespace() {
        let editable = EditableSummary::from(&sample())
            .with_point(PointSection::Decisions, 0, "  Ship Friday  ")
            .with_action_field(0, ActionField::DueDate, "   ");

        let summary = editable.to_summary();
        assert_eq!(summary.decisions, vec![SummaryPoint::text("Ship Friday")]);
        assert_eq!(summary.action_items[0].due_date, None);

        let raw = serde_json::json!({
            "overview": "Kickoff",
            "decisions": ["  Ship Friday  "],
            "discussions": ["Timeline"],
            "action_items": [
                {"description": "Book room", "assignee": "Ana", "due_date": "   ", "confidence": 0.73}
            ]
        });
        assert_eq!(crate::summary::sanitize_edited_summary(&raw), summary);
    }
}
