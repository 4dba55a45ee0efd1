use crate::{MediaType, Transcriber, TranscriptionError};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{header, Client};
use serde::Deserialize;
use std::time::Duration;
use tokio::time::{sleep, timeout};

pub const DEFAULT_BASE_URL: &str = "https://api.assemblyai.com";

/// Everything the HTTP transcriber needs, handed over at construction.
#[derive(Debug, Clone)]
pub struct TranscriberConfig {
    pub api_key: String,
    pub base_url: String,
    /// Upper bound for upload, job creation and polling together.
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl TranscriberConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(120),
            poll_interval: Duration::from_millis(1500),
        }
    }
}

#[derive(Deserialize)]
struct UploadResponse {
    upload_url: String,
}

#[derive(Deserialize)]
struct TranscriptResponse {
    id: String,
    status: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Client for an AssemblyAI-style REST service: upload, create job, poll.
pub struct HttpTranscriber {
    client: Client,
    config: TranscriberConfig,
}

impl HttpTranscriber {
    pub fn new(config: TranscriberConfig) -> Result<Self, TranscriptionError> {
        if config.api_key.trim().is_empty() {
            return Err(TranscriptionError::Config("api key is empty".into()));
        }
        if config.poll_interval.is_zero() {
            return Err(TranscriptionError::Config("poll interval must be positive".into()));
        }
        let mut headers = header::HeaderMap::new();
        let mut auth = header::HeaderValue::from_str(&config.api_key)
            .map_err(|_| TranscriptionError::Config("api key is not a valid header value".into()))?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn run(&self, audio: Bytes, media_type: MediaType) -> Result<String, TranscriptionError> {
        let size = audio.len();
        let upload: UploadResponse = self
            .client
            .post(self.url("/v2/upload"))
            .header(header::CONTENT_TYPE, media_type.mime())
            .body(audio)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        tracing::debug!(size, %media_type, "audio uploaded");

        let mut job: TranscriptResponse = self
            .client
            .post(self.url("/v2/transcript"))
            .json(&serde_json::json!({ "audio_url": upload.upload_url }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        tracing::debug!(job_id = %job.id, "transcription job created");

        loop {
            match job.status.as_str() {
                "completed" => {
                    let text = job.text.unwrap_or_default();
                    if text.trim().is_empty() { return Err(TranscriptionError::EmptyTranscript); }
                    tracing::info!(job_id = %job.id, chars = text.len(), "transcription complete");
                    return Ok(text);
                }
                "error" => {
                    return Err(TranscriptionError::Service(job.error.unwrap_or_else(|| "unknown error".into())));
                }
                _ => {}
            }
            sleep(self.config.poll_interval).await;
            job = self
                .client
                .get(self.url(&format!("/v2/transcript/{}", job.id)))
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
        }
    }
}

#[async_trait]
impl Transcriber for HttpTranscriber {
    async fn transcribe(&self, audio: Bytes, media_type: MediaType) -> Result<String, TranscriptionError> {
        match timeout(self.config.timeout, self.run(audio, media_type)).await {
            Ok(Err(TranscriptionError::Http(e))) if e.is_timeout() => Err(TranscriptionError::Timeout(self.config.timeout)),
            Ok(res) => res,
            Err(_) => Err(TranscriptionError::Timeout(self.config.timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_key() {
        assert!(matches!(HttpTranscriber::new(TranscriberConfig::new("  ")), Err(TranscriptionError::Config(_))));
    }

    #[test]
    fn joins_urls_without_double_slash() {
        let mut cfg = TranscriberConfig::new("key");
        cfg.base_url = "http://localhost:9000/".into();
        let t = HttpTranscriber::new(cfg).unwrap();
        assert_eq!(t.url("/v2/upload"), "http://localhost:9000/v2/upload");
    }
}
