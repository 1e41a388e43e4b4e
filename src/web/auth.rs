// Auth middleware: static shared-secret checks.
//
// Public API: the caller sends the configured header (default `x-api-key`)
// with the exact value of TOPICAST_API_KEY. Anything else is a 403 before
// the body is even read, so no inference work happens on a bad key.
//
// Scoring endpoint: when SCORING_API_KEY is set, callers must send
// `Authorization: Bearer <key>`; when it's empty the endpoint is open (it is
// expected to sit behind the hosting platform's own gateway).

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use super::{score_error, ApiError, AppState};
use crate::error::PipelineError;

/// Axum middleware: reject requests without the shared API key with 403.
pub async fn require_api_key(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let provided = request
        .headers()
        .get(state.config.api_key_header.as_str())
        .and_then(|v| v.to_str().ok());

    if !key_matches(&state.config.api_key, provided) {
        warn!(
            path = %request.uri().path(),
            header_present = provided.is_some(),
            "Rejected request with missing or invalid API key"
        );
        return ApiError(PipelineError::Auth).into_response();
    }

    next.run(request).await
}

/// Axum middleware for the scoring endpoint's optional bearer token.
pub async fn require_scoring_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let expected = &state.config.scoring_api_key;
    if expected.is_empty() {
        return next.run(request).await;
    }

    let provided = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    if !key_matches(expected, provided) {
        warn!("Rejected scoring request with missing or invalid bearer token");
        return score_error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }

    next.run(request).await
}

/// Exact-equality check. An empty expected key never matches.
pub fn key_matches(expected: &str, provided: Option<&str>) -> bool {
    match provided {
        Some(provided) => !expected.is_empty() && constant_time_eq(expected, provided),
        None => false,
    }
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}
