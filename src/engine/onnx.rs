// ONNX classifier: runs an exported multi-output classifier graph.
//
// The training job exports its classifier as `classifier.onnx` with a single
// float input named `float_input` of shape [batch, n_features]. The first
// output holds one row of n_labels values per input: either predicted labels
// (i64) or per-label probabilities (f32). Values >= 0.5 count as a positive
// label.

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::Tensor;
use tracing::debug;

use super::traits::Classifier;
use crate::error::PipelineError;
use crate::features::FeatureVector;
use crate::labels::LabelVector;

/// Input tensor name used by the exporter.
const INPUT_NAME: &str = "float_input";

/// Probability at or above which a label is considered predicted.
const DECISION_THRESHOLD: f32 = 0.5;

pub struct OnnxClassifier {
    // ort::Session::run takes &mut self, so the session sits behind a Mutex.
    // Callers already run inference on a blocking thread.
    session: Mutex<Session>,
    n_features: usize,
    n_labels: usize,
}

impl OnnxClassifier {
    /// Load the classifier graph. Any failure here means the model is not
    /// available, which is fatal at startup.
    pub fn load(path: &Path, n_features: usize, n_labels: usize) -> Result<Self, PipelineError> {
        if n_features == 0 || n_labels == 0 {
            return Err(PipelineError::ModelNotLoaded(format!(
                "classifier needs a non-empty feature and label space (got {n_features} features, {n_labels} labels)"
            )));
        }
        if !path.exists() {
            return Err(PipelineError::ModelNotLoaded(format!(
                "classifier file not found: {}",
                path.display()
            )));
        }

        let session = Session::builder()
            .and_then(|builder| builder.commit_from_file(path))
            .map_err(|e| {
                PipelineError::ModelNotLoaded(format!(
                    "failed to load ONNX classifier from {}: {e}",
                    path.display()
                ))
            })?;

        debug!(
            path = %path.display(),
            n_features,
            n_labels,
            "Loaded ONNX classifier"
        );

        Ok(Self {
            session: Mutex::new(session),
            n_features,
            n_labels,
        })
    }
}

impl Classifier for OnnxClassifier {
    fn predict(&self, features: &[FeatureVector]) -> Result<Vec<LabelVector>, PipelineError> {
        if features.is_empty() {
            return Ok(Vec::new());
        }

        let batch_size = features.len();
        let mut flat: Vec<f32> = Vec::with_capacity(batch_size * self.n_features);
        for row in features {
            if row.len() != self.n_features {
                return Err(PipelineError::shape(
                    "classifier input",
                    self.n_features,
                    row.len(),
                ));
            }
            flat.extend_from_slice(row);
        }

        let shape = [batch_size as i64, self.n_features as i64];
        let input = Tensor::from_array((shape, flat))
            .map_err(|e| PipelineError::Inference(format!("failed to build input tensor: {e}")))?;

        let bits: Vec<u8> = {
            let mut session = self
                .session
                .lock()
                .map_err(|e| PipelineError::Inference(format!("session lock poisoned: {e}")))?;

            let outputs = session
                .run(ort::inputs! { INPUT_NAME => input })
                .map_err(|e| PipelineError::Inference(format!("ONNX inference failed: {e}")))?;

            // Label outputs are i64; probability outputs are f32.
            match outputs[0].try_extract_tensor::<i64>() {
                Ok((_shape, data)) => data.iter().map(|&v| u8::from(v != 0)).collect(),
                Err(_) => {
                    let (_shape, data) = outputs[0].try_extract_tensor::<f32>().map_err(|e| {
                        PipelineError::Inference(format!("failed to extract output tensor: {e}"))
                    })?;
                    data.iter()
                        .map(|&v| u8::from(v >= DECISION_THRESHOLD))
                        .collect()
                }
            }
        };

        if bits.len() != batch_size * self.n_labels {
            return Err(PipelineError::shape(
                "classifier output",
                batch_size * self.n_labels,
                bits.len(),
            ));
        }

        Ok(bits.chunks(self.n_labels).map(<[u8]>::to_vec).collect())
    }

    fn name(&self) -> &str {
        "onnx"
    }
}
