use crate::api::ApiServer;
use crate::config::Config;
use crate::pipeline::MeetingService;
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

pub async fn run_service() -> Result<()> {
    info!("Starting minutegraph service");

    let config = Config::load()?;
    let service = Arc::new(MeetingService::from_config(&config)?);

    info!("Database: {:?}", service.database().path());
    info!("Recordings bucket: {:?}", config.bucket_dir()?);
    if !service.transcription_available() {
        warn!(
            "Transcription provider '{}' is not ready; set OPENAI_API_KEY or stt.api_key",
            config.stt.provider
        );
    }
    if config.retention.cron_secret.is_none() {
        warn!("CRON_SECRET is not set; the cleanup endpoint is open");
    }

    ApiServer::new(service, &config).start().await
}
