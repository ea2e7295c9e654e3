//! Transcript summarization through a chat-completion model.

pub mod summarizer;

pub use summarizer::{parse_summary_response, OpenAISummarizer, Summarizer};
