use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::future::Future;
use std::pin::Pin;
use tracing::{debug, error, info};

use super::TranscriptionProvider;

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    pub(crate) error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorDetail {
    pub(crate) message: String,
    pub(crate) r#type: Option<String>,
    pub(crate) code: Option<String>,
}

/// Build the error for a non-success OpenAI response, preferring the
/// structured message when the body carries one.
pub(crate) fn api_error(service: &str, status: reqwest::StatusCode, body: &str) -> anyhow::Error {
    error!("{} request failed with status {}: {}", service, status, body);

    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(error_response) => anyhow::anyhow!(
            "{} error: {} (type: {:?}, code: {:?})",
            service,
            error_response.error.message,
            error_response.error.r#type,
            error_response.error.code
        ),
        Err(_) => anyhow::anyhow!("{} request failed with status {}: {}", service, status, body),
    }
}

pub struct OpenAIProvider {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
}

impl OpenAIProvider {
    pub fn new(api_key: String, endpoint: Option<String>, model: String) -> Result<Self> {
        let client = reqwest::Client::new();
        let endpoint = endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        info!(
            "Initialized OpenAI transcription provider with endpoint: {} (model: {})",
            endpoint, model
        );

        Ok(Self {
            client,
            api_key,
            endpoint,
            model,
        })
    }

    fn transcriptions_url(&self) -> String {
        format!("{}/audio/transcriptions", self.endpoint.trim_end_matches('/'))
    }
}

impl TranscriptionProvider for OpenAIProvider {
    fn name(&self) -> &'static str {
        "OpenAI API"
    }

    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn transcribe<'a>(
        &'a self,
        audio: Vec<u8>,
        file_name: &'a str,
        language: Option<&'a str>,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move {
            info!(
                "Transcribing {} ({} bytes) via OpenAI API",
                file_name,
                audio.len()
            );

            let part = Part::bytes(audio)
                .file_name(file_name.to_string())
                .mime_str("application/octet-stream")
                .context("Failed to build audio part")?;

            let mut form = Form::new()
                .part("file", part)
                .text("model", self.model.clone());
            if let Some(language) = language.filter(|l| !l.is_empty()) {
                form = form.text("language", language.to_string());
            }

            let response = self
                .client
                .post(self.transcriptions_url())
                .bearer_auth(&self.api_key)
                .multipart(form)
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

            let transcription: TranscriptionResponse = serde_json::from_str(&response_text)
                .context("Failed to parse transcription response")?;

            let text = transcription.text.trim().to_string();
            info!("Transcription complete: {} chars", text.len());
            debug!("Raw transcription: {}", text);

            Ok(text)
        })
    }
}
