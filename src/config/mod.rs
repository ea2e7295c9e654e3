use crate::global;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub stt: SttConfig,
    pub llm: LlmConfig,
    pub retention: RetentionConfig,
    pub share: ShareConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root directory for uploaded audio. Defaults to `<data_dir>/recordings`.
    pub bucket_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SttConfig {
    /// `openai` or `assemblyai`
    pub provider: String,
    pub model: String,
    pub api_key: Option<String>,
    pub api_endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub api_endpoint: Option<String>,
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    pub file_retention_days: u32,
    pub max_batch: usize,
    /// Bearer secret for the cleanup endpoint. Open when unset.
    pub cron_secret: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
    pub default_expiry_hours: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3838,
        }
    }
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini-transcribe".to_string(),
            api_key: None,
            api_endpoint: None,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            api_endpoint: None,
            temperature: 0.3,
        }
    }
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            file_retention_days: 30,
            max_batch: 200,
            cron_secret: None,
        }
    }
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            default_expiry_hours: 24 * 7,
        }
    }
}

impl Config {
    /// Load from disk (writing defaults on first run), then apply
    /// environment overrides.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        let mut config = if !config_path.exists() {
            info!(
                "Config file not found, creating default at {:?}",
                config_path
            );
            let config = Self::default();
            config.save()?;
            config
        } else {
            let content =
                std::fs::read_to_string(&config_path).context("Failed to read config file")?;
            let config: Self = toml::from_str(&content).context("Failed to parse config file")?;
            info!("Loaded config from {:?}", config_path);
            config
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Overlay `OPENAI_API_KEY`, `STT_PROVIDER`, `CRON_SECRET` and
    /// `FILE_RETENTION_DAYS`. The API key only fills keys left unset.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(key) = non_empty("OPENAI_API_KEY") {
            if self.stt.api_key.is_none() {
                self.stt.api_key = Some(key.clone());
            }
            if self.llm.api_key.is_none() {
                self.llm.api_key = Some(key);
            }
        }

        if let Some(provider) = non_empty("STT_PROVIDER") {
            self.stt.provider = provider;
        }

        if let Some(secret) = non_empty("CRON_SECRET") {
            self.retention.cron_secret = Some(secret);
        }

        if let Some(days) = non_empty("FILE_RETENTION_DAYS") {
            match days.trim().parse() {
                Ok(days) => self.retention.file_retention_days = days,
                Err(_) => warn!("Ignoring invalid FILE_RETENTION_DAYS value: {}", days),
            }
        }
    }

    pub fn bucket_dir(&self) -> Result<PathBuf> {
        match &self.storage.bucket_dir {
            Some(dir) => Ok(PathBuf::from(dir)),
            None => global::recordings_dir(),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    fn config_path() -> Result<PathBuf> {
        global::config_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.bind_address(), "127.0.0.1:3838");
        assert_eq!(config.stt.provider, "openai");
        assert_eq!(config.stt.model, "gpt-4o-mini-transcribe");
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.retention.file_retention_days, 30);
        assert_eq!(config.retention.max_batch, 200);
        assert_eq!(config.share.default_expiry_hours, 168);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            port = 9000

            [llm]
            temperature = 0.5
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.llm.temperature, 0.5);
        assert_eq!(config.llm.model, "gpt-4o-mini");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.llm.api_key = Some("configured".to_string());

        config.apply_env(env(&[
            ("OPENAI_API_KEY", "from-env"),
            ("STT_PROVIDER", "assemblyai"),
            ("CRON_SECRET", "s3cret"),
            ("FILE_RETENTION_DAYS", "7"),
        ]));

        assert_eq!(config.stt.api_key.as_deref(), Some("from-env"));
        assert_eq!(config.llm.api_key.as_deref(), Some("configured"));
        assert_eq!(config.stt.provider, "assemblyai");
        assert_eq!(config.retention.cron_secret.as_deref(), Some("s3cret"));
        assert_eq!(config.retention.file_retention_days, 7);
    }

    #[test]
    fn test_invalid_retention_env_is_ignored() {
        let mut config = Config::default();
        config.apply_env(env(&[("FILE_RETENTION_DAYS", "soon"), ("CRON_SECRET", "  ")]));
        assert_eq!(config.retention.file_retention_days, 30);
        assert!(config.retention.cron_secret.is_none());
    }

    #[test]
    fn test_round_trip_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.bind_address(), config.bind_address());
        assert_eq!(parsed.stt.model, config.stt.model);
    }
}
