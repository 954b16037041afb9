//! HTTP server
//!
//! Routes:
//! - `POST /persona`     `{"address": "0x…"}`
//! - `POST /similarity`  `{"address1": "0x…", "address2": "0x…"}`
//! - `GET  /health`
//! - `GET  /clusters`
//!
//! Bad addresses answer 400, ledger failures 502, so callers can tell their
//! own mistakes from upstream outages. Unparseable bodies keep axum's status
//! (400, 415 or 422) but use the same error body.

use axum::{
    extract::{rejection::JsonRejection, Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::engine::PersonaEngine;
use crate::error::Error;
use crate::persona::Persona;

#[derive(Debug, Deserialize)]
pub struct PersonaRequest {
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub struct SimilarityRequest {
    pub address1: String,
    pub address2: String,
}

#[derive(Debug, Serialize)]
pub struct SimilarityResponse {
    pub similarity: f64,
}

/// Error body: `{"error": <category>, "message": <text>}`
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

/// Request failure mapped onto an HTTP status
pub enum ApiError {
    /// Engine error
    Engine(Error),
    /// Body missing, not JSON, or missing a field
    Body(JsonRejection),
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self::Engine(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Body(rejection)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, category, message) = match self {
            Self::Body(rejection) => (rejection.status(), "invalid_request", rejection.body_text()),
            Self::Engine(e) => {
                let (status, category) = if e.is_client_error() {
                    (StatusCode::BAD_REQUEST, "invalid_address")
                } else if e.is_upstream() {
                    (StatusCode::BAD_GATEWAY, "upstream_lookup")
                } else {
                    (StatusCode::INTERNAL_SERVER_ERROR, "internal")
                };
                if status.is_server_error() {
                    warn!(error = %e, status = status.as_u16(), "Request failed");
                }
                (status, category, e.to_string())
            }
        };

        let body = ErrorBody {
            error: category,
            message,
        };
        (status, Json(body)).into_response()
    }
}

/// Build the application router
pub fn router(engine: Arc<PersonaEngine>) -> Router {
    Router::new()
        .route("/persona", post(persona_handler))
        .route("/similarity", post(similarity_handler))
        .route("/health", get(health_handler))
        .route("/clusters", get(clusters_handler))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &Request| {
                tracing::info_span!(
                    "http",
                    method = %req.method(),
                    path = %req.uri().path(),
                    request_id = %Uuid::new_v4(),
                )
            }),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(engine)
}

/// Bind and serve until Ctrl-C
pub async fn serve(engine: Arc<PersonaEngine>, bind_addr: SocketAddr) -> anyhow::Result<()> {
    let app = router(engine);

    info!("Wallet persona v{} starting", env!("CARGO_PKG_VERSION"));
    info!("  Listening on: http://{}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

async fn persona_handler(
    State(engine): State<Arc<PersonaEngine>>,
    payload: Result<Json<PersonaRequest>, JsonRejection>,
) -> Result<Json<Persona>, ApiError> {
    let Json(req) = payload?;
    let persona = engine.derive_persona(&req.address).await?;
    Ok(Json(persona))
}

async fn similarity_handler(
    State(engine): State<Arc<PersonaEngine>>,
    payload: Result<Json<SimilarityRequest>, JsonRejection>,
) -> Result<Json<SimilarityResponse>, ApiError> {
    let Json(req) = payload?;
    let similarity = engine
        .compute_similarity(&req.address1, &req.address2)
        .await?;
    Ok(Json(SimilarityResponse { similarity }))
}

async fn health_handler(State(engine): State<Arc<PersonaEngine>>) -> impl IntoResponse {
    let ledger_connected = engine.ledger_healthy().await;
    Json(serde_json::json!({
        "status": if ledger_connected { "healthy" } else { "degraded" },
        "version": env!("CARGO_PKG_VERSION"),
        "profiles": engine.store_size().await,
        "ledger_connected": ledger_connected,
    }))
}

async fn clusters_handler(State(engine): State<Arc<PersonaEngine>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "model": engine.cluster_summary().await,
    }))
}
