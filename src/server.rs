//! HTTP server.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/chat` | Answer a question grounded in the current report |
//! | `POST` | `/report` | Generate a new report, save it, re-index |
//! | `GET`  | `/get_report` | Current report text |
//! | `POST` | `/search` | Ranked lines with scores |
//! | `GET`  | `/health` | Version and index status |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "index_unavailable", "message": "no index snapshot has been published yet" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `llm_error` (502),
//! `index_unavailable` (503), `internal` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so a browser front end
//! served from another origin can call the API.

use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use report_harness_core::search::{rank_normalized, texts_or_sentinel};
use report_harness_core::{IndexHandle, PreconditionError, SearchHit};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};

use crate::chat;
use crate::config::Config;
use crate::document::DocumentStore;
use crate::engine;
use crate::llm::{create_backend, CompletionBackend};
use crate::profiles::load_tables;
use crate::prompt::report_prompt;
use crate::report;

/// Shared state handed to every route handler.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    index: Arc<IndexHandle>,
    store: DocumentStore,
    chat: Arc<dyn CompletionBackend>,
    report: Arc<dyn CompletionBackend>,
    /// Serializes save + rebuild so two reports never interleave.
    publish_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(
        config: Config,
        index: Arc<IndexHandle>,
        chat: Arc<dyn CompletionBackend>,
        report: Arc<dyn CompletionBackend>,
    ) -> Self {
        let store = DocumentStore::new(&config.document.path);
        Self {
            config: Arc::new(config),
            index,
            store,
            chat,
            report,
            publish_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Build state from config, indexing the current document.
    ///
    /// An unindexable document is logged, not fatal: the server starts and
    /// search-backed routes answer 503 until a report indexes cleanly.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let chat = create_backend(&config.llm.chat_backend, &config.llm)
            .context("Failed to create chat backend")?;
        let report = create_backend(&config.llm.report_backend, &config.llm)
            .context("Failed to create report backend")?;

        let index = Arc::new(engine::create_handle(config)?);
        let state = Self::new(config.clone(), index, chat, report);

        let text = state.store.load().await?;
        if let Err(e) = engine::rebuild(state.index.clone(), text).await {
            tracing::warn!(
                path = %state.store.path().display(),
                error = %format!("{:#}", e),
                "document not indexed; search routes unavailable until the next report"
            );
        }
        Ok(state)
    }

    pub fn index(&self) -> &Arc<IndexHandle> {
        &self.index
    }
}

/// The API router with CORS applied.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/chat", post(handle_chat))
        .route("/report", post(handle_report))
        .route("/get_report", get(handle_get_report))
        .route("/search", post(handle_search))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state)
}

/// Index the document, bind `[server].bind`, and serve until terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let state = AppState::from_config(config).await?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;
    tracing::info!(bind = %config.server.bind, "server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(code = self.code, message = %self.message, "request failed");
        }
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<PreconditionError> for AppError {
    fn from(e: PreconditionError) -> Self {
        index_unavailable(e.to_string())
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request",
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found",
        message: message.into(),
    }
}

fn index_unavailable(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::SERVICE_UNAVAILABLE,
        code: "index_unavailable",
        message: message.into(),
    }
}

fn llm_error(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_GATEWAY,
        code: "llm_error",
        message: message.into(),
    }
}

fn internal(err: anyhow::Error) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal",
        message: format!("{:#}", err),
    }
}

/// A precondition failure means no index; anything else came from the model.
fn classify_completion_error(err: anyhow::Error) -> AppError {
    match err.downcast_ref::<PreconditionError>() {
        Some(e) => index_unavailable(e.to_string()),
        None => llm_error(format!("{:#}", err)),
    }
}

// ============ POST /chat ============

#[derive(Deserialize)]
struct ChatRequest {
    #[serde(default)]
    prev_chat: String,
    prompt: String,
}

#[derive(Serialize)]
struct CompletionResponse {
    response: String,
}

async fn handle_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<CompletionResponse>, AppError> {
    if req.prompt.trim().is_empty() {
        return Err(bad_request("prompt must not be empty"));
    }

    let response = chat::answer(
        &state.index,
        state.chat.as_ref(),
        state.config.retrieval.top_k,
        &req.prompt,
        &req.prev_chat,
    )
    .await
    .map_err(classify_completion_error)?;

    Ok(Json(CompletionResponse { response }))
}

// ============ POST /report ============

#[derive(Deserialize)]
struct ReportRequest {
    info: String,
}

async fn handle_report(
    State(state): State<AppState>,
    Json(req): Json<ReportRequest>,
) -> Result<Json<CompletionResponse>, AppError> {
    if req.info.trim().is_empty() {
        return Err(bad_request("info must not be empty"));
    }

    let tables = load_tables(&state.config.profiles.tables)
        .await
        .map_err(internal)?;
    let response = state
        .report
        .complete(&report_prompt(&tables, &req.info))
        .await
        .map_err(|e| llm_error(format!("{:#}", e)))?;

    let _guard = state.publish_lock.lock().await;
    report::publish(&state.store, &state.index, &response)
        .await
        .map_err(internal)?;

    Ok(Json(CompletionResponse { response }))
}

// ============ GET /get_report ============

async fn handle_get_report(
    State(state): State<AppState>,
) -> Result<Json<CompletionResponse>, AppError> {
    if !state.store.exists().await {
        return Err(not_found(format!(
            "no report at {}",
            state.store.path().display()
        )));
    }
    let response = state.store.load().await.map_err(internal)?;
    Ok(Json(CompletionResponse { response }))
}

// ============ POST /search ============

#[derive(Deserialize)]
struct SearchRequest {
    query: String,
    #[serde(default)]
    top_k: Option<usize>,
}

#[derive(Serialize)]
struct SearchResponse {
    query: String,
    normalized_query: String,
    results: Vec<SearchHit>,
    context: String,
}

async fn handle_search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, AppError> {
    let snapshot = state.index.snapshot()?;
    let top_k = req.top_k.unwrap_or(state.config.retrieval.top_k);

    let normalized_query = snapshot.normalizer().normalize(&req.query);
    let results = rank_normalized(&snapshot, &normalized_query, top_k)?;
    let context = texts_or_sentinel(results.clone()).join("\n");

    Ok(Json(SearchResponse {
        query: req.query,
        normalized_query,
        results,
        context,
    }))
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    indexed: bool,
    generation: u64,
    lines: usize,
    features: usize,
    analyzer: String,
    fingerprint: Option<String>,
    built_at: Option<DateTime<Utc>>,
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    let snapshot = state.index.snapshot().ok();
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        indexed: snapshot.is_some(),
        generation: snapshot.as_ref().map(|s| s.generation()).unwrap_or(0),
        lines: snapshot.as_ref().map(|s| s.corpus().len()).unwrap_or(0),
        features: snapshot.as_ref().map(|s| s.space().dimension()).unwrap_or(0),
        analyzer: state.index.normalizer().analyzer_name().to_string(),
        fingerprint: snapshot.as_ref().map(|s| s.fingerprint().to_string()),
        built_at: snapshot.as_ref().map(|s| s.built_at()),
    })
}
