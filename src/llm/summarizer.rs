use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::config::LlmConfig;
use crate::error::ProviderError;
use crate::summary::{sanitize_edited_summary, SummaryResult};
use crate::transcription::providers::openai_api::{api_error, DEFAULT_ENDPOINT};

const SYSTEM_PROMPT: &str = "You summarize meeting transcripts and structure their action items. \
Always respond with JSON only.";

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(
        &self,
        transcript: &str,
        meeting_id: &str,
        language: Option<&str>,
    ) -> Result<SummaryResult>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    response_format: ResponseFormat,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    r#type: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

fn user_prompt(transcript: &str, meeting_id: &str, language: Option<&str>) -> String {
    format!(
        "Meeting ID: {}\nLanguage: {}\nSummarize the following transcript and output the JSON \
         fields overview, decisions[], discussions[], action_items[] (each with description, \
         assignee, due_date, confidence between 0 and 1).\nTranscript:\n\"\"\"{}\"\"\"",
        meeting_id,
        language.unwrap_or("unknown"),
        transcript
    )
}

/// Decode the model's message content. Content that is not a JSON object
/// is an error; fields inside it are coerced like a user edit.
pub fn parse_summary_response(content: &str) -> Result<SummaryResult> {
    let value: Value =
        serde_json::from_str(content.trim()).context("Summarizer returned invalid JSON")?;
    if !value.is_object() {
        anyhow::bail!("Summarizer returned JSON that is not an object");
    }
    Ok(sanitize_edited_summary(&value))
}

pub struct OpenAISummarizer {
    client: reqwest::Client,
    config: LlmConfig,
}

impl OpenAISummarizer {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn completions_url(&self) -> String {
        let endpoint = self.config.api_endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT);
        format!("{}/chat/completions", endpoint.trim_end_matches('/'))
    }
}

#[async_trait]
impl Summarizer for OpenAISummarizer {
    async fn summarize(
        &self,
        transcript: &str,
        meeting_id: &str,
        language: Option<&str>,
    ) -> Result<SummaryResult> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(ProviderError::MissingCredentials("OPENAI_API_KEY"))?;

        info!(
            "Summarizing meeting {} ({} chars) with {}",
            meeting_id,
            transcript.len(),
            self.config.model
        );

        let request = ChatRequest {
            model: &self.config.model,
            temperature: self.config.temperature,
            response_format: ResponseFormat {
                r#type: "json_object",
            },
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt(transcript, meeting_id, language),
                },
            ],
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to OpenAI API")?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .context("Failed to read response body")?;

        if !status.is_success() {
            return Err(api_error("OpenAI API", status, &response_text));
        }

        let completion: ChatResponse =
            serde_json::from_str(&response_text).context("Failed to parse completion response")?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .context("Summarizer returned an empty response")?;

        debug!("Raw summary response: {}", content);

        parse_summary_response(&content).map_err(|e| {
            error!("[summarizer] invalid JSON response: {}", e);
            e
        })
    }
}
