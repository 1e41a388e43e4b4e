// Engine traits: the swap-ready abstractions behind the service boundary.
//
// `Classifier` is the in-process inference engine: feature vectors in,
// label vectors out, one per input and in the same order.
//
// `TopicPredictor` is what the HTTP layer talks to: texts in, decoded
// predictions out. The local predictor runs the whole artifact bundle in
// process; the remote predictor forwards to the hosted scoring endpoint.

use async_trait::async_trait;

use crate::error::PipelineError;
use crate::features::FeatureVector;
use crate::labels::LabelVector;
use crate::pipeline::PredictionResult;

/// A trained multi-output classifier.
pub trait Classifier: Send + Sync {
    /// Predict one label vector per feature vector, preserving order.
    fn predict(&self, features: &[FeatureVector]) -> Result<Vec<LabelVector>, PipelineError>;

    /// Short name for logging.
    fn name(&self) -> &str;
}

/// Turns a batch of texts into predictions. Implementations must be async
/// because the canonical one is an HTTP call.
#[async_trait]
pub trait TopicPredictor: Send + Sync {
    /// Predict topics for every text, returning results in request order.
    async fn predict(&self, texts: &[String]) -> Result<Vec<PredictionResult>, PipelineError>;

    /// Backend name for logging.
    fn name(&self) -> &'static str;
}
