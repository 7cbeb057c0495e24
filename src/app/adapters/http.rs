//! HTTP adapter
//!
//! Exposes product loading and trade enrichment as streaming endpoints.
//! Request bodies are never buffered: they are handed to the pipeline as a
//! byte stream, and enriched output is written back as a chunked response
//! while later chunks are still being processed.
//!
//! | Method | Path                        | Result                              |
//! |--------|-----------------------------|-------------------------------------|
//! | POST   | `/api/v1/product/{format}`  | JSON load statistics                |
//! | POST   | `/api/v1/enrich/{format}`   | streamed enriched trades            |
//! | GET    | `/health`                   | liveness and store backend          |
//!
//! An unsupported format tag is rejected with 400 before any byte of the body
//! is read. A failure in the middle of an enrichment aborts the response body.

use crate::app::services::format_parser::FileFormat;
use crate::app::services::pipeline::{LoadStats, enrich_stream, load_products};
use crate::app::services::product_store::ProductStore;
use crate::config::{Config, PipelineConfig};
use crate::{Error, Result};
use axum::body::Body;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Shared state for every request
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ProductStore>,
    pub pipeline: Arc<PipelineConfig>,
    /// Cancelled on shutdown; each request runs under a child token
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ProductStore>,
        pipeline: PipelineConfig,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            store,
            pipeline: Arc::new(pipeline),
            shutdown,
        }
    }
}

/// Build the service router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/product/:format", post(load_product_file))
        .route("/api/v1/enrich/:format", post(enrich_trade_file))
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}

/// Bind to `config.server.bind` and serve until `shutdown` is cancelled
pub async fn serve(
    config: &Config,
    store: Arc<dyn ProductStore>,
    shutdown: CancellationToken,
) -> Result<()> {
    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| Error::io(format!("failed to bind {}", addr), e))?;

    info!(
        "Listening on {} ({} store, {} concurrent chunks)",
        addr,
        store.backend_type(),
        config.pipeline.max_concurrent_chunks
    );

    let state = AppState::new(store, config.pipeline.clone(), shutdown.clone());
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| Error::io("HTTP server failed", e))?;

    info!("HTTP server stopped");
    Ok(())
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "store": state.store.backend_type(),
    }))
}

async fn load_product_file(
    State(state): State<AppState>,
    Path(tag): Path<String>,
    body: Body,
) -> std::result::Result<Json<LoadStats>, ApiError> {
    let format = FileFormat::from_tag(&tag)?;
    info!("Product upload received ({})", format);

    let stats = load_products(
        body.into_data_stream(),
        format,
        state.store.clone(),
        &state.pipeline,
        state.shutdown.child_token(),
    )
    .await?;

    Ok(Json(stats))
}

async fn enrich_trade_file(
    State(state): State<AppState>,
    Path(tag): Path<String>,
    body: Body,
) -> std::result::Result<Response, ApiError> {
    let format = FileFormat::from_tag(&tag)?;
    info!("Trade upload received ({})", format);

    let stream = enrich_stream(
        body.into_data_stream(),
        format,
        state.store.clone(),
        &state.pipeline,
        state.shutdown.child_token(),
    );

    Ok((
        [(header::CONTENT_TYPE, state.pipeline.output_format.content_type())],
        Body::from_stream(stream),
    )
        .into_response())
}

/// Error returned from a handler, rendered as `{"error": "..."}`
#[derive(Debug)]
pub struct ApiError(Error);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            Error::UnsupportedFormat { .. } | Error::StreamRead { .. } => StatusCode::BAD_REQUEST,
            Error::Store { .. } => StatusCode::BAD_GATEWAY,
            Error::LookupTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            Error::ProcessingInterrupted { .. } => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        } else {
            warn!("Request rejected: {}", self.0);
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}
