use crate::session::SessionConfig;
use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub source: SourceConfig,
    #[serde(default)]
    pub readalong: SessionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Base URL of the archive API (e.g. "https://archive.example.org/api")
    pub api_base_url: String,

    /// NATS server URL
    pub nats_url: String,

    /// Subject prefix for per-testimony segment channels
    #[serde(default = "default_subject_prefix")]
    pub subject_prefix: String,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_subject_prefix() -> String {
    "transcript.stream".to_string()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

impl Config {
    /// Load from a config file, with `READALONG__SECTION__KEY` environment overrides
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(
                config::Environment::with_prefix("READALONG")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read config from {}", path))?;

        Ok(settings.try_deserialize()?)
    }
}
