//! Decision/discussion points and the normalizer for their stored forms.
//!
//! Stored fields are plain text that may hold a JSON array, a single JSON
//! object, newline-delimited lines, or the `[object Object]` artifact left by
//! an older serializer. Everything is folded into [`SummaryPoint`] here so the
//! rest of the crate never handles raw JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Prefix of a stringified object written by an earlier serializer.
const OBJECT_ARTIFACT_PREFIX: &str = "[object";

/// One decision or discussion entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged, from = "Value")]
pub enum SummaryPoint {
    Text(String),
    Structured {
        #[serde(skip_serializing_if = "Option::is_none")]
        topic: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        details: Option<String>,
    },
}

impl SummaryPoint {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn structured(topic: Option<&str>, details: Option<&str>) -> Self {
        Self::Structured {
            topic: topic.map(str::to_string),
            details: details.map(str::to_string),
        }
    }

    /// Display form: text as-is, structured as `topic: details` over the
    /// fields that are present and non-empty.
    pub fn render(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Structured { topic, details } => [topic.as_deref(), details.as_deref()]
                .into_iter()
                .flatten()
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(": "),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.render().trim().is_empty()
    }
}

impl From<Value> for SummaryPoint {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => Self::Text(text),
            Value::Object(map) => Self::Structured {
                topic: map.get("topic").and_then(field_text),
                details: map.get("details").and_then(field_text),
            },
            other => Self::Text(other.to_string()),
        }
    }
}

fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

/// Normalize a stored or model-provided field into ordered points.
///
/// Never fails: JSON that does not parse is logged and re-read as lines.
pub fn normalize(raw: Option<&str>) -> Vec<SummaryPoint> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    if trimmed.starts_with(OBJECT_ARTIFACT_PREFIX) {
        return vec![SummaryPoint::Text(trimmed.to_string())];
    }

    if looks_like_json(trimmed) {
        match serde_json::from_str::<Value>(trimmed) {
            Ok(Value::Array(items)) => return items.into_iter().map(SummaryPoint::from).collect(),
            Ok(value) => return vec![SummaryPoint::from(value)],
            Err(e) => warn!("Stored summary field is not valid JSON, reading it as lines: {}", e),
        }
    }

    split_lines(trimmed)
}

fn looks_like_json(text: &str) -> bool {
    (text.starts_with('[') && text.ends_with(']')) || (text.starts_with('{') && text.ends_with('}'))
}

fn split_lines(text: &str) -> Vec<SummaryPoint> {
    text.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(SummaryPoint::text)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_empty_inputs() {
        assert!(normalize(None).is_empty());
        assert!(normalize(Some("")).is_empty());
        assert!(normalize(Some("  \n\t ")).is_empty());
    }

    #[test]
    fn test_normalize_json_array_of_strings() {
        let points = normalize(Some(r#"["Adopt plan A","Defer plan B"]"#));
        assert_eq!(
            points,
            vec![SummaryPoint::text("Adopt plan A"), SummaryPoint::text("Defer plan B")]
        );
    }

    #[test]
    fn test_normalize_json_array_of_objects() {
        let points = normalize(Some(
            r#"[{"topic":"Budget","details":"Approved"},{"topic":"Hiring"},{}]"#,
        ));
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].render(), "Budget: Approved");
        assert_eq!(points[1].render(), "Hiring");
        // Empty objects survive normalization.
        assert_eq!(points[2], SummaryPoint::structured(None, None));
        assert!(points[2].is_blank());
    }

    #[test]
    fn test_normalize_single_object() {
        let points = normalize(Some(r#" {"topic":"Launch","details":"Friday"} "#));
        assert_eq!(points, vec![SummaryPoint::structured(Some("Launch"), Some("Friday"))]);
    }

    #[test]
    fn test_normalize_non_string_array_elements() {
        let points = normalize(Some("[1, true, null]"));
        assert_eq!(
            points,
            vec![
                SummaryPoint::text("1"),
                SummaryPoint::text("true"),
                SummaryPoint::text("null")
            ]
        );
    }

    #[test]
    fn test_normalize_lines() {
        let points = normalize(Some("  first point \n\n second point\n   \nthird"));
        assert_eq!(
            points,
            vec![
                SummaryPoint::text("first point"),
                SummaryPoint::text("second point"),
                SummaryPoint::text("third")
            ]
        );
    }

    #[test]
    fn test_normalize_malformed_json_falls_back_to_lines() {
        let points = normalize(Some("[not json\nreally not]"));
        assert_eq!(
            points,
            vec![SummaryPoint::text("[not json"), SummaryPoint::text("really not]")]
        );
    }

    #[test]
    fn test_normalize_object_artifact_is_opaque() {
        let points = normalize(Some("[object Object]\n[object Object]"));
        assert_eq!(
            points,
            vec![SummaryPoint::text("[object Object]\n[object Object]")]
        );
    }

    #[test]
    fn test_render_skips_empty_fields() {
        let point = SummaryPoint::Structured {
            topic: Some(String::new()),
            details: Some("Only details".to_string()),
        };
        assert_eq!(point.render(), "Only details");
    }

    #[test]
    fn test_deserialize_from_model_output() {
        let points: Vec<SummaryPoint> =
            serde_json::from_str(r#"["plain", {"topic": "T", "details": "D"}, 3]"#).unwrap();
        assert_eq!(points[0], SummaryPoint::text("plain"));
        assert_eq!(points[1], SummaryPoint::structured(Some("T"), Some("D")));
        assert_eq!(points[2], SummaryPoint::text("3"));
    }

    #[test]
    fn test_serialize_shapes() {
        let json = serde_json::to_string(&vec![
            SummaryPoint::text("a"),
            SummaryPoint::structured(Some("t"), None),
        ])
        .unwrap();
        assert_eq!(json, r#"["a",{"topic":"t"}]"#);
    }
}
