//! Speech-to-text.
//!
//! [`Transcriber`] resolves the configured provider on every call, so a
//! missing key or an unsupported provider fails the request that needs it
//! instead of the whole service.

use anyhow::{bail, Result};
use std::future::Future;
use std::pin::Pin;
use tracing::info;

use crate::config::SttConfig;
use crate::error::ProviderError;

pub mod providers;

pub use providers::{OpenAIProvider, TranscriptionProvider};

pub const OPENAI: &str = "openai";
pub const ASSEMBLYAI: &str = "assemblyai";

pub struct Transcriber {
    config: SttConfig,
}

impl Transcriber {
    pub fn new(config: SttConfig) -> Self {
        Self { config }
    }

    pub fn provider_name(&self) -> &str {
        &self.config.provider
    }

    fn resolve(&self) -> Result<Box<dyn TranscriptionProvider>> {
        match self.config.provider.as_str() {
            OPENAI => {
                let api_key = self
                    .config
                    .api_key
                    .clone()
                    .filter(|key| !key.is_empty())
                    .ok_or(ProviderError::MissingCredentials("OPENAI_API_KEY"))?;
                Ok(Box::new(OpenAIProvider::new(
                    api_key,
                    self.config.api_endpoint.clone(),
                    self.config.model.clone(),
                )?))
            }
            ASSEMBLYAI => Err(ProviderError::NotImplemented(ASSEMBLYAI.to_string()).into()),
            other => bail!(
                "Unknown transcription provider '{}'. Supported providers: {}, {}",
                other,
                OPENAI,
                ASSEMBLYAI
            ),
        }
    }
}

impl TranscriptionProvider for Transcriber {
    fn name(&self) -> &'static str {
        "Configured transcriber"
    }

    fn is_available(&self) -> bool {
        self.resolve()
            .map(|provider| provider.is_available())
            .unwrap_or(false)
    }

    fn transcribe<'a>(
        &'a self,
        audio: Vec<u8>,
        file_name: &'a str,
        language: Option<&'a str>,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move {
            let provider = self.resolve()?;
            info!("Using {} for transcription", provider.name());
            provider.transcribe(audio, file_name, language).await
        })
    }
}
