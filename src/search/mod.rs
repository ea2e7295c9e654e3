//! Case-insensitive literal search over transcripts.
//!
//! Search terms are escaped with [`regex::escape`] before being compiled, so
//! every character in a term matches itself.

use regex::{Regex, RegexBuilder};
use serde::Serialize;

/// Characters of context kept on each side of a match.
pub const EXCERPT_RADIUS: usize = 40;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptMatch {
    /// Byte offset of the match in the transcript.
    pub index: usize,
    pub excerpt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub text: String,
    pub matched: bool,
}

fn literal_pattern(term: &str) -> Option<Regex> {
    let term = term.trim();
    if term.is_empty() {
        return None;
    }
    RegexBuilder::new(&regex::escape(term))
        .case_insensitive(true)
        .build()
        .ok()
}

/// Every occurrence of `term` with a short surrounding excerpt. Excerpts
/// are prefixed or suffixed with `...` when cut.
pub fn transcript_matches(text: &str, term: &str) -> Vec<TranscriptMatch> {
    let Some(pattern) = literal_pattern(term) else {
        return Vec::new();
    };

    pattern
        .find_iter(text)
        .map(|found| TranscriptMatch {
            index: found.start(),
            excerpt: excerpt(text, found.start(), found.end()),
        })
        .collect()
}

fn excerpt(text: &str, start: usize, end: usize) -> String {
    let from = text[..start]
        .char_indices()
        .rev()
        .nth(EXCERPT_RADIUS - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);
    let to = text[end..]
        .char_indices()
        .nth(EXCERPT_RADIUS)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());

    let mut excerpt = String::new();
    if from > 0 {
        excerpt.push_str("...");
    }
    excerpt.push_str(text[from..to].trim());
    if to < text.len() {
        excerpt.push_str("...");
    }
    excerpt
}

/// Split `text` into alternating plain and matched segments. Empty segments
/// are omitted; a blank term yields the whole text unmatched.
pub fn highlight(text: &str, term: &str) -> Vec<Segment> {
    let Some(pattern) = literal_pattern(term) else {
        return vec![Segment {
            text: text.to_string(),
            matched: false,
        }];
    };

    let mut segments = Vec::new();
    let mut cursor = 0;
    for found in pattern.find_iter(text) {
        if found.start() > cursor {
            segments.push(Segment {
                text: text[cursor..found.start()].to_string(),
                matched: false,
            });
        }
        segments.push(Segment {
            text: found.as_str().to_string(),
            matched: true,
        });
        cursor = found.end();
    }
    if cursor < text.len() {
        segments.push(Segment {
            text: text[cursor..].to_string(),
            matched: false,
        });
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_are_case_insensitive() {
        let matches = transcript_matches("Budget first. Then the budget review.", "BUDGET");
        let indexes: Vec<usize> = matches.iter().map(|m| m.index).collect();
        assert_eq!(indexes, vec![0, 23]);
    }

    #[test]
    fn test_special_characters_match_literally() {
        let text = "Costs rose (a lot) by 5.0% then fell [again].";
        assert_eq!(transcript_matches(text, "(a lot)").len(), 1);
        assert_eq!(transcript_matches(text, "5.0%").len(), 1);
        assert_eq!(transcript_matches(text, "[again]").len(), 1);
        assert!(transcript_matches(text, "5x0").is_empty());
    }

    #[test]
    fn test_excerpt_is_bounded() {
        let text = format!("{}needle{}", "a".repeat(100), "b".repeat(100));
        let found = &transcript_matches(&text, "needle")[0];
        assert_eq!(found.excerpt, format!("...{}needle{}...", "a".repeat(40), "b".repeat(40)));
    }

    #[test]
    fn test_short_text_has_no_ellipsis() {
        let found = &transcript_matches("the needle here", "needle")[0];
        assert_eq!(found.excerpt, "the needle here");
    }

    #[test]
    fn test_blank_term() {
        assert!(transcript_matches("anything", "  ").is_empty());
        assert_eq!(
            highlight("anything", ""),
            vec![Segment {
                text: "anything".to_string(),
                matched: false
            }]
        );
    }

    #[test]
    fn test_highlight_segments() {
        let segments = highlight("Ask Bob. bob agrees.", "bob");
        let rendered: Vec<(&str, bool)> = segments.iter().map(|s| (s.text.as_str(), s.matched)).collect();
        assert_eq!(
            rendered,
            vec![("Ask ", false), ("Bob", true), (". ", false), ("bob", true), (" agrees.", false)]
        );
    }
}
