// Request and response bodies for the public API and the scoring endpoint.
//
// Requests are validated here, before any vectorization or forwarding:
// 1..=100 texts, each non-blank and at most MAX_TEXT_CHARS characters.

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::pipeline::PredictionResult;

pub const MIN_TEXTS: usize = 1;
pub const MAX_TEXTS: usize = 100;
pub const MAX_TEXT_CHARS: usize = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextRequest {
    pub text: Vec<String>,
}

impl TextRequest {
    pub fn validate(&self) -> Result<(), PipelineError> {
        let count = self.text.len();
        if !(MIN_TEXTS..=MAX_TEXTS).contains(&count) {
            return Err(PipelineError::InvalidRequest(format!(
                "text must contain between {MIN_TEXTS} and {MAX_TEXTS} items, got {count}"
            )));
        }
        for (i, text) in self.text.iter().enumerate() {
            if text.trim().is_empty() {
                return Err(PipelineError::InvalidRequest(format!(
                    "text[{i}] must not be empty"
                )));
            }
            let chars = text.chars().count();
            if chars > MAX_TEXT_CHARS {
                return Err(PipelineError::InvalidRequest(format!(
                    "text[{i}] is {chars} characters; the limit is {MAX_TEXT_CHARS}"
                )));
            }
        }
        Ok(())
    }
}

/// Public API body. Both fields are always present; exactly one is non-null.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub topics: Option<Vec<PredictionResult>>,
    pub error: Option<String>,
}

impl PredictResponse {
    pub fn success(topics: Vec<PredictionResult>) -> Self {
        Self {
            topics: Some(topics),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            topics: None,
            error: Some(message.into()),
        }
    }
}

/// Scoring endpoint body: `{"predictions": [...]}` or `{"error": "..."}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predictions: Option<Vec<PredictionResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
