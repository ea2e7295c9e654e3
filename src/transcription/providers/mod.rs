use anyhow::Result;
use std::future::Future;
use std::pin::Pin;

pub mod openai_api;

pub use openai_api::OpenAIProvider;

pub trait TranscriptionProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn is_available(&self) -> bool;

    fn transcribe<'a>(
        &'a self,
        audio: Vec<u8>,
        file_name: &'a str,
        language: Option<&'a str>,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;
}
