// Remote predictor: forwards batches to the hosted scoring endpoint.
//
// This is the canonical backend for the public API. The hosted endpoint is
// `topicast serve-scoring` (or anything speaking the same contract):
//   POST {"text": [...]}  ->  200 {"predictions": [...]}  |  5xx {"error": "..."}
// Non-2xx answers are surfaced with their status; nothing is retried.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use super::traits::TopicPredictor;
use crate::error::PipelineError;
use crate::output::truncate_chars;
use crate::pipeline::PredictionResult;
use crate::web::schemas::{ScoreResponse, TextRequest};

pub struct RemotePredictor {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl RemotePredictor {
    /// Create a predictor for `endpoint`. An empty `api_key` sends no
    /// Authorization header.
    pub fn new(endpoint: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            api_key,
        }
    }
}

#[async_trait]
impl TopicPredictor for RemotePredictor {
    async fn predict(&self, texts: &[String]) -> Result<Vec<PredictionResult>, PipelineError> {
        let request = TextRequest {
            text: texts.to_vec(),
        };

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if !self.api_key.is_empty() {
            builder = builder.bearer_auth(&self.api_key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Scoring endpoint unreachable");
                PipelineError::RemoteTransport(e.without_url().to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::RemoteCall {
                status: status.as_u16(),
                body: truncate_chars(&body, 500),
            });
        }

        let parsed: ScoreResponse = response
            .json()
            .await
            .map_err(|e| {
                PipelineError::RemoteTransport(format!("invalid response body: {}", e.without_url()))
            })?;

        let predictions = match (parsed.predictions, parsed.error) {
            (_, Some(error)) => {
                return Err(PipelineError::RemoteCall {
                    status: status.as_u16(),
                    body: error,
                })
            }
            (Some(predictions), None) => predictions,
            (None, None) => {
                return Err(PipelineError::RemoteTransport(
                    "response has neither predictions nor error".to_string(),
                ))
            }
        };

        if predictions.len() != texts.len() {
            return Err(PipelineError::shape(
                "remote response",
                texts.len(),
                predictions.len(),
            ));
        }
        if let Some(pos) = texts
            .iter()
            .zip(&predictions)
            .position(|(text, prediction)| prediction.input_text != *text)
        {
            return Err(PipelineError::Inference(format!(
                "remote response out of order: prediction {pos} does not echo its input text"
            )));
        }

        debug!(
            endpoint = %self.endpoint,
            predictions = predictions.len(),
            "Remote endpoint predicted batch"
        );
        Ok(predictions)
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}
