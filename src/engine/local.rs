// In-process predictor over a loaded artifact bundle.
//
// Vectorization and classification are CPU-bound, so they run on a
// blocking thread and the async runtime stays free for other requests.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::traits::TopicPredictor;
use crate::artifacts::bundle::ArtifactBundle;
use crate::error::PipelineError;
use crate::pipeline::PredictionResult;

#[derive(Clone)]
pub struct LocalPredictor {
    bundle: Arc<ArtifactBundle>,
}

impl LocalPredictor {
    pub fn new(bundle: Arc<ArtifactBundle>) -> Self {
        Self { bundle }
    }
}

#[async_trait]
impl TopicPredictor for LocalPredictor {
    async fn predict(&self, texts: &[String]) -> Result<Vec<PredictionResult>, PipelineError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let bundle = Arc::clone(&self.bundle);
        let texts = texts.to_vec();

        let results = tokio::task::spawn_blocking(move || bundle.predict(&texts))
            .await
            .map_err(|e| PipelineError::Inference(format!("inference task failed: {e}")))??;

        debug!(
            predictions = results.len(),
            classifier = self.bundle.classifier_name(),
            "Local bundle predicted batch"
        );
        Ok(results)
    }

    fn name(&self) -> &'static str {
        "local"
    }
}
