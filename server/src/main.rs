use anyhow::Result;
use axum::Router;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use subsearch_server::{build_app, ServerSettings, DEFAULT_LINK_BASE, DEFAULT_MAX_AUDIO_BYTES};
use subsearch_transcriber::{HttpTranscriber, Transcriber, TranscriberConfig};
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Snapshot written by `subsearch-indexer build`
    #[arg(long, env = "SUBSEARCH_SNAPSHOT", default_value = "./processed_data.snap")]
    snapshot: String,
    /// Host to bind
    #[arg(long, env = "SUBSEARCH_HOST", default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, env = "SUBSEARCH_PORT", default_value_t = 8080)]
    port: u16,
    /// Base for result links; the subtitle id is appended
    #[arg(long, env = "SUBSEARCH_LINK_BASE", default_value = DEFAULT_LINK_BASE)]
    link_base: String,
    /// Token required by /admin/reload
    #[arg(long, env = "ADMIN_TOKEN", hide_env_values = true)]
    admin_token: Option<String>,
    /// Comma-separated allowed origins (any when unset)
    #[arg(long, env = "CORS_ALLOW_ORIGIN")]
    cors_allow_origin: Option<String>,
    /// Largest audio upload /search/audio accepts, in bytes
    #[arg(long, env = "SUBSEARCH_MAX_AUDIO_BYTES", default_value_t = DEFAULT_MAX_AUDIO_BYTES)]
    max_audio_bytes: usize,
    /// Speech-to-text API key; audio search is disabled without it
    #[arg(long, env = "TRANSCRIBER_API_KEY", hide_env_values = true)]
    transcriber_api_key: Option<String>,
    #[arg(long, env = "TRANSCRIBER_BASE_URL", default_value = subsearch_transcriber::DEFAULT_BASE_URL)]
    transcriber_base_url: String,
    /// Upper bound for one transcription, upload to final text
    #[arg(long, env = "TRANSCRIBER_TIMEOUT_SECS", default_value_t = 120)]
    transcriber_timeout_secs: u64,
    #[arg(long, env = "TRANSCRIBER_POLL_MS", default_value_t = 1500)]
    transcriber_poll_ms: u64,
}

impl Args {
    fn transcriber(&self) -> Result<Option<Arc<dyn Transcriber>>> {
        let Some(key) = &self.transcriber_api_key else {
            tracing::warn!("TRANSCRIBER_API_KEY not set; /search/audio will answer 503");
            return Ok(None);
        };
        let config = TranscriberConfig {
            api_key: key.clone(),
            base_url: self.transcriber_base_url.clone(),
            timeout: Duration::from_secs(self.transcriber_timeout_secs),
            poll_interval: Duration::from_millis(self.transcriber_poll_ms),
        };
        Ok(Some(Arc::new(HttpTranscriber::new(config)?)))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let transcriber = args.transcriber()?;
    let settings = ServerSettings {
        snapshot_path: args.snapshot.clone().into(),
        link_base: args.link_base.clone(),
        admin_token: args.admin_token.clone(),
        cors_allow_origin: args.cors_allow_origin.clone(),
        max_audio_bytes: args.max_audio_bytes,
    };
    let app: Router = build_app(settings, transcriber)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
