// Web server: Axum routers for the public API and the hosted scoring endpoint.
//
// Public API (`topicast serve`):
//   GET  /health     liveness, no key
//   POST /predict/   keyed, forwards to the configured TopicPredictor
//
// Scoring endpoint (`topicast serve-scoring`), the process the hosted
// container runs over a local artifact bundle:
//   GET  /health
//   POST /score      optional bearer token
//
// Every failure leaves through `ApiError`, the one place pipeline errors
// become HTTP statuses.

use std::sync::Arc;

use anyhow::Result;
use axum::http::{header, HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::engine::traits::TopicPredictor;
use crate::error::PipelineError;

pub mod auth;
pub mod handlers;
pub mod schemas;

use schemas::{PredictResponse, ScoreResponse};

/// Shared application state threaded through all Axum handlers.
///
/// The predictor (and the artifact bundle inside a local predictor) is built
/// before the listener binds and never mutated afterwards.
#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<dyn TopicPredictor>,
    pub config: Arc<Config>,
}

/// Start the public API and block until it exits.
pub async fn run_server(state: AppState, port: u16, bind: &str) -> Result<()> {
    let app = build_router(state.clone());
    let addr = format!("{bind}:{port}");
    info!(
        backend = state.predictor.name(),
        "Topic prediction API listening on http://{addr}"
    );
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Start the scoring endpoint and block until it exits.
pub async fn run_scoring_server(state: AppState, port: u16, bind: &str) -> Result<()> {
    let app = build_scoring_router(state);
    let addr = format!("{bind}:{port}");
    info!("Scoring endpoint listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    // Keyed routes (require the shared API key)
    let protected_api = Router::new()
        .route("/predict/", post(handlers::predict::predict))
        .route("/predict", post(handlers::predict::predict))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ));

    let public_api = Router::new().route("/health", get(health));

    Router::new()
        .merge(protected_api)
        .merge(public_api)
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers(cors_allowed_headers(&state.config)),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Request headers a browser may send to the public API: the JSON content
/// type and the configured key header.
fn cors_allowed_headers(config: &Config) -> Vec<HeaderName> {
    let mut headers = vec![header::CONTENT_TYPE];
    match HeaderName::from_bytes(config.api_key_header.as_bytes()) {
        Ok(name) => headers.push(name),
        Err(e) => warn!(header = %config.api_key_header, error = %e, "API key header not allowed for CORS"),
    }
    headers
}

pub fn build_scoring_router(state: AppState) -> Router {
    let scoring = Router::new()
        .route("/score", post(handlers::score::score))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth::require_scoring_token,
        ));

    Router::new()
        .merge(scoring)
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check. Always returns 200 OK once the server is listening.
async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "ok" })),
    )
}

/// Public API error: a pipeline failure on its way out as HTTP.
#[derive(Debug)]
pub struct ApiError(pub PipelineError);

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// Status code and caller-facing message for this failure.
    pub fn status_and_message(&self) -> (StatusCode, String) {
        match &self.0 {
            PipelineError::Auth => (StatusCode::FORBIDDEN, self.0.to_string()),
            PipelineError::InvalidRequest(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            err if err.is_client_visible() => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            error!(error = %self.0, "Prediction failed");
        } else if status != StatusCode::FORBIDDEN {
            warn!(error = %self.0, "Rejected prediction request");
        }
        (status, Json(PredictResponse::failure(message))).into_response()
    }
}

/// Scoring endpoint error body (`{"error": "..."}`).
pub fn score_error(status: StatusCode, message: &str) -> Response {
    let body = ScoreResponse {
        predictions: None,
        error: Some(message.to_string()),
    };
    (status, Json(body)).into_response()
}
