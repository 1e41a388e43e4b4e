// Typed failures for every stage of the prediction pipeline.
//
// Internal components return `Result<_, PipelineError>`. The web layer is the
// only place that turns one of these into an HTTP status and message.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Shared-secret check failed.
    #[error("Forbidden")]
    Auth,

    /// The vectorizer is missing or was never fitted.
    #[error("feature extraction unavailable: {0}")]
    Feature(String),

    /// The classifier is missing or could not be loaded.
    #[error("model not loaded: {0}")]
    ModelNotLoaded(String),

    /// Two stages disagree on batch size or vector width.
    #[error("shape mismatch in {stage}: expected {expected}, got {actual}")]
    ShapeMismatch {
        stage: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A topic id outside the codec's classes was passed to `encode`.
    #[error("unknown topic id {0} is not part of the label space")]
    UnknownLabel(u32),

    /// The hosted model endpoint answered with a non-2xx status.
    #[error("Error: {status}, {body}")]
    RemoteCall { status: u16, body: String },

    /// The hosted model endpoint could not be reached or parsed.
    #[error("remote model call failed: {0}")]
    RemoteTransport(String),

    /// Request failed boundary validation.
    #[error("{0}")]
    InvalidRequest(String),

    /// Anything unexpected during inference (runtime errors, panics).
    #[error("inference failed: {0}")]
    Inference(String),

    /// Artifact directory problems other than the classifier or vectorizer.
    #[error("artifact error: {0}")]
    Artifact(String),
}

impl PipelineError {
    pub fn shape(stage: &'static str, expected: usize, actual: usize) -> Self {
        Self::ShapeMismatch {
            stage,
            expected,
            actual,
        }
    }

    /// Whether the message is safe to show to an API caller verbatim.
    ///
    /// `Inference` wraps arbitrary runtime errors and `RemoteTransport`
    /// carries connection detail about the scoring endpoint; both stay
    /// internal.
    pub fn is_client_visible(&self) -> bool {
        !matches!(self, Self::Inference(_) | Self::RemoteTransport(_))
    }
}
