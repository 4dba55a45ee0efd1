use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use subsearch_core::snippet::{anchor_terms, highlight_terms};
use subsearch_core::{RankedResult, SearchError, SimilarityIndex, SnapshotMeta, SnapshotStore, DEFAULT_TOP_K};
use subsearch_transcriber::{MediaType, Transcriber, TranscriptionError};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub const DEFAULT_LINK_BASE: &str = "https://www.opensubtitles.org/en/subtitles";
/// Largest accepted `/search/audio` upload.
pub const DEFAULT_MAX_AUDIO_BYTES: usize = 200 * 1024 * 1024;
const MAX_K: usize = 100;

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub snapshot_path: PathBuf,
    pub link_base: String,
    pub admin_token: Option<String>,
    /// Comma-separated origins; `None` allows any.
    pub cors_allow_origin: Option<String>,
    pub max_audio_bytes: usize,
}

impl ServerSettings {
    pub fn new<P: Into<PathBuf>>(snapshot_path: P) -> Self {
        Self {
            snapshot_path: snapshot_path.into(),
            link_base: DEFAULT_LINK_BASE.to_string(),
            admin_token: None,
            cors_allow_origin: None,
            max_audio_bytes: DEFAULT_MAX_AUDIO_BYTES,
        }
    }
}

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
}

#[derive(Deserialize)]
pub struct AudioParams {
    #[serde(default = "default_k")]
    pub k: usize,
}

fn default_k() -> usize { DEFAULT_TOP_K }

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuerySource {
    Typed,
    Transcribed,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub source: QuerySource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    pub took_ms: u128,
    pub took_s: f64,
    /// Results with a non-zero score.
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub id: i64,
    pub name: String,
    pub score: f32,
    pub link: String,
    pub snippet: String,
}

/// A loaded snapshot. Replaced as a whole on reload, never mutated.
pub struct LoadedSnapshot {
    pub index: SimilarityIndex,
    pub meta: SnapshotMeta,
}

#[derive(Clone)]
pub struct AppState {
    snapshot: Arc<RwLock<Arc<LoadedSnapshot>>>,
    store: SnapshotStore,
    transcriber: Option<Arc<dyn Transcriber>>,
    link_base: Arc<str>,
    admin_token: Option<String>,
    max_audio_bytes: usize,
}

impl AppState {
    pub fn new(settings: &ServerSettings, loaded: LoadedSnapshot, transcriber: Option<Arc<dyn Transcriber>>) -> Self {
        Self {
            snapshot: Arc::new(RwLock::new(Arc::new(loaded))),
            store: SnapshotStore::new(&settings.snapshot_path),
            transcriber,
            link_base: Arc::from(settings.link_base.trim_end_matches('/')),
            admin_token: settings.admin_token.clone(),
            max_audio_bytes: settings.max_audio_bytes,
        }
    }

    /// The snapshot in use right now. Ranking runs on this Arc without holding the lock.
    pub fn current(&self) -> Arc<LoadedSnapshot> { self.snapshot.read().clone() }

    fn swap(&self, loaded: LoadedSnapshot) { *self.snapshot.write() = Arc::new(loaded); }

    fn link(&self, id: i64) -> String { format!("{}/{}", self.link_base, id) }
}

pub fn load_snapshot(path: &std::path::Path) -> Result<LoadedSnapshot> {
    let (index, meta) = SnapshotStore::new(path)
        .load()
        .with_context(|| format!("cannot serve without a snapshot (looked at {})", path.display()))?;
    Ok(LoadedSnapshot { index, meta })
}

pub fn build_app(settings: ServerSettings, transcriber: Option<Arc<dyn Transcriber>>) -> Result<Router> {
    let loaded = load_snapshot(&settings.snapshot_path)?;
    tracing::info!(num_docs = loaded.index.len(), created_at = %loaded.meta.created_at, "snapshot ready");
    let state = AppState::new(&settings, loaded, transcriber);
    Ok(router(state, settings.cors_allow_origin.as_deref()))
}

pub fn router(state: AppState, cors_allow_origin: Option<&str>) -> Router {
    let cors = match cors_allow_origin {
        Some(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        None => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let audio_limit = DefaultBodyLimit::max(state.max_audio_bytes);
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/health/snapshot", get(snapshot_handler))
        .route("/search", get(search_handler))
        .route("/search/audio", post(audio_search_handler).layer(audio_limit))
        .route("/doc/:id", get(doc_handler))
        .route("/admin/reload", post(reload_handler))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

type ApiError = (StatusCode, Json<Value>);

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    (status, Json(json!({ "error": msg.into() })))
}

fn search_error(e: SearchError) -> ApiError {
    match e {
        SearchError::EmptyQuery => api_error(StatusCode::BAD_REQUEST, e.to_string()),
    }
}

fn transcription_error(e: TranscriptionError) -> ApiError {
    let status = match e {
        TranscriptionError::UnsupportedMedia(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        TranscriptionError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::BAD_GATEWAY,
    };
    api_error(status, format!("transcription failed: {e}"))
}

/// The one rendering path, whatever the query came from.
fn render(
    state: &AppState,
    source: QuerySource,
    query: String,
    transcript: Option<String>,
    results: Vec<RankedResult>,
    terms: &[String],
    start: Instant,
) -> SearchResponse {
    let total_hits = results.iter().filter(|r| r.score > 0.0).count();
    let results = results
        .into_iter()
        .map(|r| SearchHit { link: state.link(r.id), snippet: highlight_terms(&r.snippet, terms), id: r.id, name: r.name, score: r.score })
        .collect();
    let elapsed = start.elapsed();
    SearchResponse { query, source, transcript, took_ms: elapsed.as_millis(), took_s: elapsed.as_secs_f64(), total_hits, results }
}

fn run_search(
    state: &AppState,
    source: QuerySource,
    query: String,
    transcript: Option<String>,
    k: usize,
    start: Instant,
) -> Result<SearchResponse, ApiError> {
    let snapshot = state.current();
    let results = snapshot.index.rank(&query, k.clamp(1, MAX_K)).map_err(search_error)?;
    tracing::debug!(?source, hits = results.len(), "ranked query");
    let terms = anchor_terms(&query, &snapshot.index.term_model().analyzer);
    Ok(render(state, source, query, transcript, results, &terms, start))
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Result<Json<SearchResponse>, ApiError> {
    let start = Instant::now();
    run_search(&state, QuerySource::Typed, params.q, None, params.k, start).map(Json)
}

pub async fn audio_search_handler(
    State(state): State<AppState>,
    Query(params): Query<AudioParams>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let start = Instant::now();
    let transcriber = state
        .transcriber
        .clone()
        .ok_or_else(|| api_error(StatusCode::SERVICE_UNAVAILABLE, "transcription is not configured"))?;
    let body = body.map_err(|rej| match rej.status() {
        StatusCode::PAYLOAD_TOO_LARGE => {
            api_error(StatusCode::PAYLOAD_TOO_LARGE, format!("audio upload exceeds {} bytes", state.max_audio_bytes))
        }
        status => api_error(status, rej.body_text()),
    })?;
    let mime = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| api_error(StatusCode::UNSUPPORTED_MEDIA_TYPE, "missing content-type"))?;
    let media_type = MediaType::from_mime(mime).map_err(transcription_error)?;
    if body.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "empty audio upload"));
    }

    let transcript = transcriber.transcribe(body, media_type).await.map_err(|e| {
        tracing::warn!(error = %e, "transcription failed");
        transcription_error(e)
    })?;
    run_search(&state, QuerySource::Transcribed, transcript.clone(), Some(transcript), params.k, start).map(Json)
}

pub async fn doc_handler(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Value>, ApiError> {
    let snapshot = state.current();
    let doc = snapshot.index.document(id).ok_or_else(|| api_error(StatusCode::NOT_FOUND, "not found"))?;
    Ok(Json(json!({
        "id": doc.id,
        "name": doc.name,
        "link": state.link(doc.id),
        "text": doc.text,
    })))
}

pub async fn snapshot_handler(State(state): State<AppState>) -> Json<Value> {
    let snapshot = state.current();
    Json(json!({
        "num_docs": snapshot.index.len(),
        "num_terms": snapshot.index.term_model().num_terms(),
        "meta": snapshot.meta,
    }))
}

async fn reload_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Value>, (StatusCode, String)> {
    authorize(&state, &headers)?;
    let store = state.store.clone();
    let loaded = tokio::task::spawn_blocking(move || store.load())
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map_err(|e| {
            tracing::warn!(error = %e, "reload failed; keeping current snapshot");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;
    let (index, meta) = loaded;
    let body = json!({ "num_docs": index.len(), "created_at": meta.created_at });
    state.swap(LoadedSnapshot { index, meta });
    tracing::info!("snapshot reloaded");
    Ok(Json(body))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), (StatusCode, String)> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}
