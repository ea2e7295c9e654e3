//! Mermaid flowchart rendering of a meeting summary.
//!
//! The output is a pure function of the summary: nodes follow input order and
//! nothing time- or randomness-dependent is embedded.

use crate::summary::{ActionItem, SummaryPoint, SummaryResult};

/// Longest label emitted, in characters.
pub const MAX_LABEL_LENGTH: usize = 120;

const ELLIPSIS: &str = "...";
const EMPTY_LABEL: &str = "-";
const UNASSIGNED: &str = "unassigned";
const UNSET: &str = "unset";

struct Section<'a> {
    id: &'a str,
    title: &'a str,
    empty_label: &'a str,
}

const DECISIONS: Section<'static> = Section {
    id: "decision",
    title: "Decisions",
    empty_label: "No items",
};

const DISCUSSIONS: Section<'static> = Section {
    id: "discussion",
    title: "Discussion Points",
    empty_label: "No items",
};

const ACTIONS: Section<'static> = Section {
    id: "action",
    title: "Action Items",
    empty_label: "No action items",
};

/// Build the `graph TD` document for a summary.
pub fn build(summary: &SummaryResult) -> String {
    let mut lines = vec![
        "graph TD".to_string(),
        "  root((\"Meeting Summary\"))".to_string(),
    ];

    let overview = summary.overview.trim();
    if !overview.is_empty() {
        lines.push(format!("  overview[\"Overview\\n{}\"]", sanitize_label(overview)));
        lines.push("  root --> overview".to_string());
    }

    let decision_labels: Vec<String> = summary.decisions.iter().map(point_label).collect();
    push_section(&mut lines, &DECISIONS, &decision_labels);

    let discussion_labels: Vec<String> = summary.discussions.iter().map(point_label).collect();
    push_section(&mut lines, &DISCUSSIONS, &discussion_labels);

    let action_labels: Vec<String> = summary.action_items.iter().map(action_label).collect();
    push_section(&mut lines, &ACTIONS, &action_labels);

    if let Some(note) = summary.diagram_summary.as_deref().filter(|note| !note.is_empty()) {
        lines.push(format!("  diagramNote[\"Note\\n{}\"]", sanitize_label(note)));
        lines.push("  root --> diagramNote".to_string());
    }

    lines.join("\n")
}

/// Make text safe to place between the double quotes of a node label.
///
/// Trims, swaps `"` for `'`, escapes line breaks as `\n`, and truncates to
/// [`MAX_LABEL_LENGTH`] characters with a trailing `...`. Never returns an
/// empty string.
pub fn sanitize_label(value: &str) -> String {
    let escaped = value
        .trim()
        .replace('"', "'")
        .replace("\r\n", "\\n")
        .replace('\n', "\\n");

    let label = truncate(&escaped);
    if label.is_empty() {
        EMPTY_LABEL.to_string()
    } else {
        label
    }
}

fn truncate(value: &str) -> String {
    if value.chars().count() <= MAX_LABEL_LENGTH {
        return value.to_string();
    }
    let kept: String = value
        .chars()
        .take(MAX_LABEL_LENGTH - ELLIPSIS.len())
        .collect();
    format!("{}{}", kept, ELLIPSIS)
}

fn push_section(lines: &mut Vec<String>, section: &Section<'_>, labels: &[String]) {
    let hub = format!("{}Hub", section.id);
    lines.push(format!("  {}[\"{}\"]", hub, sanitize_label(section.title)));
    lines.push(format!("  root --> {}", hub));

    if labels.is_empty() {
        lines.push(format!(
            "  {} --> {}Empty[\"{}\"]",
            hub, section.id, section.empty_label
        ));
        return;
    }

    for (index, label) in labels.iter().enumerate() {
        let node = format!("{}{}", section.id, index);
        lines.push(format!("  {}(\"{}\")", node, label));
        lines.push(format!("  {} --> {}", hub, node));
    }
}

fn point_label(point: &SummaryPoint) -> String {
    sanitize_label(&point.render())
}

fn action_label(item: &ActionItem) -> String {
    let description = sanitize_label(&item.description);
    let assignee = sanitize_label(non_empty_or(&item.assignee, UNASSIGNED));
    let due_date = sanitize_label(non_empty_or(item.due_date.as_deref().unwrap_or_default(), UNSET));
    let confidence = (item.confidence * 100.0).round() as i64;

    format!(
        "{}\\nOwner: {}\\nDue: {}\\nConfidence: {}%",
        description, assignee, due_date, confidence
    )
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}
