//! HTTP server.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/reset` | Rebuild the vector store; streams `text/plain` progress lines |
//! | `GET`  | `/search?q=...` | Top matches as a JSON array of recipes with `distance` |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "query must not be empty" } }
//! ```
//!
//! Error codes: `bad_request` (400), `corpus_missing` (500),
//! `not_initialized` (500), `embedding_failed` (500), `internal` (500).
//!
//! Once `/reset` has started streaming the status is already `200`; later
//! failures, including a panic inside the rebuild, arrive as a final
//! `fatal: ...` line.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so browser front ends
//! can call the API directly.

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::StreamExt;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::Config;
use crate::corpus;
use crate::embedding::{create_provider, EmbeddingProvider};
use crate::error::Error;
use crate::models::SearchHit;
use crate::progress::{ChannelProgress, RebuildEvent};
use crate::rebuild;
use crate::search::search_recipes;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    provider: Arc<dyn EmbeddingProvider>,
}

impl AppState {
    pub fn new(config: Config, provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            config: Arc::new(config),
            provider,
        }
    }
}

/// Builds the router. Exposed so tests can drive it without a socket.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/reset", get(handle_reset))
        .route("/search", get(handle_search))
        .route("/health", get(handle_health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Starts the HTTP server on `[server].bind` using the configured provider.
///
/// Runs until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let provider = create_provider(&config.embedding)?;
    let bind_addr = config.server.bind.clone();
    let app = router(AppState::new(config.clone(), provider));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(
        bind = %bind_addr,
        provider = %config.embedding.provider,
        corpus = %config.data.corpus_path.display(),
        store = %config.data.store_path.display(),
        "server listening"
    );
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

/// Internal error type that converts into an Axum HTTP response.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        let (status, code) = match &err {
            Error::EmptyQuery => (StatusCode::BAD_REQUEST, "bad_request"),
            Error::CorpusMissing(_) | Error::CorpusInvalid { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "corpus_missing")
            }
            Error::StoreMissing(_) | Error::StoreInvalid { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "not_initialized")
            }
            e if e.is_provider_failure() => (StatusCode::INTERNAL_SERVER_ERROR, "embedding_failed"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        };
        if status.is_server_error() {
            error!(code, error = %err, "request failed");
        }
        AppError {
            status,
            code,
            message: err.to_string(),
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET /reset ============

/// Handler for `GET /reset`.
///
/// Loads the corpus up front so a missing corpus is a plain `500`. The
/// rebuild then runs on its own task, feeding progress lines into the
/// response body as they happen. A second task waits on the rebuild and
/// writes a `fatal:` line if it panicked. The body ends once both senders
/// are gone.
async fn handle_reset(State(state): State<AppState>) -> Result<Response, AppError> {
    let recipes = corpus::load_corpus(&state.config.data.corpus_path).await?;
    let (tx, rx) = mpsc::unbounded_channel();
    let watcher_tx = tx.clone();

    let rebuild_task = tokio::spawn(async move {
        let progress = ChannelProgress::new(tx);
        if let Err(e) =
            rebuild::rebuild_store(&state.config, state.provider.as_ref(), &recipes, &progress)
                .await
        {
            error!(error = %e, "reset aborted");
        }
    });

    tokio::spawn(async move {
        if let Err(e) = rebuild_task.await {
            error!(error = %e, "reset task failed");
            let _ = watcher_tx.send(RebuildEvent::Fatal {
                reason: format!("reset task failed: {}", e),
            });
        }
    });

    let lines = UnboundedReceiverStream::new(rx)
        .map(|event| Ok::<_, Infallible>(format!("{}\n", event)));

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(lines),
    )
        .into_response())
}

// ============ GET /search ============

#[derive(Deserialize)]
pub struct SearchParams {
    q: Option<String>,
}

/// Handler for `GET /search?q=...`.
///
/// A missing or blank `q` is rejected before any file or provider access.
async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<SearchHit>>, AppError> {
    let query = params.q.unwrap_or_default();
    if query.trim().is_empty() {
        return Err(Error::EmptyQuery.into());
    }

    let hits = search_recipes(&state.config, state.provider.as_ref(), &query).await?;
    Ok(Json(hits))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_error_mapping() {
        let cases = vec![
            (Error::EmptyQuery, StatusCode::BAD_REQUEST, "bad_request"),
            (
                Error::CorpusMissing(PathBuf::from("recipes.json")),
                StatusCode::INTERNAL_SERVER_ERROR,
                "corpus_missing",
            ),
            (
                Error::StoreMissing(PathBuf::from("embeddings.json")),
                StatusCode::INTERNAL_SERVER_ERROR,
                "not_initialized",
            ),
            (
                Error::EmptyEmbedding,
                StatusCode::INTERNAL_SERVER_ERROR,
                "embedding_failed",
            ),
            (
                Error::io("x", std::io::Error::other("disk")),
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal",
            ),
        ];
        for (err, status, code) in cases {
            let app_err = AppError::from(err);
            assert_eq!(app_err.status, status);
            assert_eq!(app_err.code, code);
        }
    }
}
