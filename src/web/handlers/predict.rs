// POST /predict/: validate a batch of texts and forward it to the
// configured predictor.
//
// The API key was already checked by middleware. Validation runs before the
// predictor is touched, so a malformed batch never reaches decoding.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use tracing::info;

use crate::error::PipelineError;
use crate::output::truncate_chars;
use crate::web::schemas::{PredictResponse, TextRequest};
use crate::web::{ApiError, AppState};

pub async fn predict(
    State(state): State<AppState>,
    body: Result<Json<TextRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(request) =
        body.map_err(|rejection| PipelineError::InvalidRequest(rejection.body_text()))?;
    request.validate()?;

    info!(
        texts = request.text.len(),
        backend = state.predictor.name(),
        first_text = %truncate_chars(&request.text[0], 50),
        "Received prediction request"
    );

    let topics = state.predictor.predict(&request.text).await?;
    if topics.len() != request.text.len() {
        return Err(PipelineError::shape("predict response", request.text.len(), topics.len()).into());
    }

    info!(predictions = topics.len(), "Prediction successful");
    Ok(Json(PredictResponse::success(topics)))
}
