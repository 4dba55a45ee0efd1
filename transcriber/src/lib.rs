//! Speech-to-text adapter. Audio goes out to an external service and plain
//! text comes back; the search pipeline treats that text like any typed query.

mod http;
mod media;

pub use http::{HttpTranscriber, TranscriberConfig, DEFAULT_BASE_URL};
pub use media::MediaType;

use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranscriptionError {
    #[error("unsupported media type '{0}' (expected mp3, wav, flac, m4a, aac or ogg)")]
    UnsupportedMedia(String),
    #[error("transcription request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("transcription service error: {0}")]
    Service(String),
    #[error("transcription timed out after {0:?}")]
    Timeout(Duration),
    #[error("transcription returned no text")]
    EmptyTranscript,
    #[error("invalid transcriber configuration: {0}")]
    Config(String),
}

#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio: Bytes, media_type: MediaType) -> Result<String, TranscriptionError>;
}
