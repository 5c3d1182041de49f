use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::services::PollSettings;

const ENV_PREFIX: &str = "APP";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,

    /// Text-generation credential. Absent keys surface as configuration
    /// errors when a prompt is requested, not at startup.
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,

    pub replicate_api_token: Option<String>,
    pub replicate_base_url: String,

    pub google_books_base_url: String,

    pub poll_interval_ms: u64,
    pub max_poll_attempts: u32,
    pub poll_deadline_secs: Option<u64>,
    pub max_concurrent_generations: usize,
    pub request_timeout_secs: u64,

    pub data_dir: PathBuf,
}

impl Config {
    /// Load configuration from `.env`, defaults and `APP_*` environment variables
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_environment(config::Environment::with_prefix(ENV_PREFIX))
    }

    fn from_environment(environment: config::Environment) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("host", "127.0.0.1")?
            .set_default("port", 8080)?
            .set_default("gemini_model", "gemini-2.5-flash")?
            .set_default(
                "gemini_base_url",
                "https://generativelanguage.googleapis.com",
            )?
            .set_default("replicate_base_url", "https://api.replicate.com")?
            .set_default("google_books_base_url", "https://www.googleapis.com")?
            .set_default("poll_interval_ms", 1000)?
            .set_default("max_poll_attempts", 300)?
            .set_default("max_concurrent_generations", 1)?
            .set_default("request_timeout_secs", 30)?
            .set_default("data_dir", "./data")?
            .add_source(environment.try_parsing(true))
            .build()
            .context("Failed to build configuration")?;

        let mut config: Config = settings
            .try_deserialize()
            .context("Invalid configuration")?;

        // Blank credentials in .env files are common; treat them as unset.
        config.gemini_api_key = config.gemini_api_key.filter(|k| !k.trim().is_empty());
        config.replicate_api_token = config
            .replicate_api_token
            .filter(|k| !k.trim().is_empty());

        if config.max_concurrent_generations == 0 {
            anyhow::bail!("APP_MAX_CONCURRENT_GENERATIONS must be at least 1");
        }
        // A zero budget would abandon every submitted job unchecked.
        if config.max_poll_attempts == 0 {
            anyhow::bail!("APP_MAX_POLL_ATTEMPTS must be at least 1");
        }

        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            interval: Duration::from_millis(self.poll_interval_ms),
            max_attempts: self.max_poll_attempts,
            deadline: self.poll_deadline_secs.map(Duration::from_secs),
        }
    }
}
