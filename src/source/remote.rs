use super::{TranscriptInfo, TranscriptSource, TranscriptStream};
use crate::config::SourceConfig;
use crate::error::{FetchError, StreamError};
use anyhow::{Context, Result};
use futures::stream::StreamExt;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, info};

/// Archive API for fetches, NATS for the incremental channel
pub struct RemoteTranscriptSource {
    http: reqwest::Client,
    api_base_url: String,
    nats: async_nats::Client,
    subject_prefix: String,
}

impl RemoteTranscriptSource {
    /// Connect to NATS and prepare the HTTP client
    pub async fn connect(config: &SourceConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .context("Failed to build HTTP client")?;

        info!("Connecting to NATS at {}", config.nats_url);

        let nats = async_nats::connect(&config.nats_url)
            .await
            .context("Failed to connect to NATS")?;

        info!("Connected to NATS successfully");

        Ok(Self {
            http,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            nats,
            subject_prefix: config.subject_prefix.clone(),
        })
    }

    fn transcript_url(&self, content_id: u64) -> String {
        format!("{}/testimonies/{}/transcript", self.api_base_url, content_id)
    }

    fn stream_subject(&self, content_id: u64) -> String {
        format!("{}.{}", self.subject_prefix, content_id)
    }
}

#[async_trait::async_trait]
impl TranscriptSource for RemoteTranscriptSource {
    async fn fetch_transcript(&self, content_id: u64) -> Result<TranscriptInfo, FetchError> {
        let url = self.transcript_url(content_id);
        debug!("Fetching transcript from {}", url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(content_id));
        }

        let response = response
            .error_for_status()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        response
            .json::<TranscriptInfo>()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }

    async fn open_stream(&self, content_id: u64) -> Result<TranscriptStream, StreamError> {
        let subject = self.stream_subject(content_id);

        info!("Subscribing to transcript segments on {}", subject);

        let subscriber = self
            .nats
            .subscribe(subject)
            .await
            .map_err(|e| StreamError::Open(e.to_string()))?;

        // Dropping the stream drops the subscriber, which unsubscribes
        Ok(subscriber.map(|msg| msg.payload.to_vec()).boxed())
    }

    fn name(&self) -> &str {
        "remote"
    }
}
