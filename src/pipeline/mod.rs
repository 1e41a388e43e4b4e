// Pipeline stages that sit on top of the artifacts:
//   decode     label vectors -> PredictionResult (the inference contract)
//   prepare    fit vectorizer, codec and topic mapping from a labelled corpus
//   evaluate   exact-match accuracy of a bundle on a labelled corpus

pub mod corpus;
pub mod decode;
pub mod evaluate;
pub mod prepare;

use serde::{Deserialize, Serialize};

/// Prediction for one input text, in request order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub input_text: String,
    /// Topic tags, e.g. `["topic 0", "topic 3"]`
    pub predicted_topics: Vec<String>,
    /// Keyword list per predicted topic, same order as `predicted_topics`
    pub decoded_topics: Vec<Vec<String>>,
}
