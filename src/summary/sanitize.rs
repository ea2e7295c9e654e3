//! Coercion of client-submitted summary edits.
//!
//! The request body is untrusted JSON. [`sanitize_edited_summary`] is total:
//! whatever it cannot interpret is dropped and a valid summary comes back.

use serde_json::{Map, Value};

use super::canonical::{ActionItem, SummaryResult};
use super::point::SummaryPoint;

pub fn sanitize_edited_summary(input: &Value) -> SummaryResult {
    let Some(fields) = input.as_object() else {
        return SummaryResult::default();
    };

    SummaryResult {
        overview: fields
            .get("overview")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        decisions: sanitize_points(fields.get("decisions")),
        discussions: sanitize_points(fields.get("discussions")),
        action_items: sanitize_action_items(fields.get("action_items")),
        diagram_summary: non_blank(fields.get("diagram_summary")),
    }
}

/// Clamp to `[0, 1]`; anything that is not a JSON number becomes 0.
pub fn clamp_confidence(value: Option<&Value>) -> f64 {
    value
        .and_then(Value::as_f64)
        .filter(|number| number.is_finite())
        .map(|number| number.clamp(0.0, 1.0))
        .unwrap_or(0.0)
}

fn sanitize_points(value: Option<&Value>) -> Vec<SummaryPoint> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::String(text) => Some(SummaryPoint::text(text.trim())),
            Value::Object(_) => Some(SummaryPoint::from(item.clone())),
            _ => None,
        })
        .filter(|point| !point.is_blank())
        .collect()
}

fn sanitize_action_items(value: Option<&Value>) -> Vec<ActionItem> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(Value::as_object)
        .filter_map(sanitize_action_item)
        .collect()
}

fn sanitize_action_item(fields: &Map<String, Value>) -> Option<ActionItem> {
    let description = fields
        .get("description")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default();
    if description.is_empty() {
        return None;
    }

    Some(ActionItem {
        description: description.to_string(),
        assignee: fields
            .get("assignee")
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or_default()
            .to_string(),
        due_date: non_blank(fields.get("due_date")),
        confidence: clamp_confidence(fields.get("confidence")),
    })
}

fn non_blank(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}
