// POST /score: the hosted scoring entry point.
//
// Runs the batch through the local artifact bundle and answers with
// `{"predictions": [...]}`. Failures become `{"error": "..."}` with a 5xx
// (or 422 for a malformed batch); internal detail stays in the logs.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{debug, error};

use crate::web::schemas::{ScoreResponse, TextRequest};
use crate::web::{score_error, ApiError, AppState};

pub async fn score(
    State(state): State<AppState>,
    body: Result<Json<TextRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            return score_error(StatusCode::UNPROCESSABLE_ENTITY, &rejection.body_text())
        }
    };
    if let Err(e) = request.validate() {
        return score_error(StatusCode::UNPROCESSABLE_ENTITY, &e.to_string());
    }

    match state.predictor.predict(&request.text).await {
        Ok(predictions) => {
            debug!(predictions = predictions.len(), "Scored batch");
            Json(ScoreResponse {
                predictions: Some(predictions),
                error: None,
            })
            .into_response()
        }
        Err(e) => {
            error!(error = %e, texts = request.text.len(), "Scoring failed");
            let (status, message) = ApiError(e).status_and_message();
            score_error(status, &message)
        }
    }
}
