// Mock backend: random predictions over a fixed demo label space.
//
// Only used when TOPICAST_BACKEND=mock is set explicitly. Predictions still
// go through the real decoding pipeline so the response shape is identical
// to the remote and local backends.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::traits::{Classifier, TopicPredictor};
use crate::error::PipelineError;
use crate::features::FeatureVector;
use crate::labels::codec::LabelCodec;
use crate::labels::mapping::TopicMapping;
use crate::labels::{LabelVector, TopicId};
use crate::pipeline::decode::assemble;
use crate::pipeline::PredictionResult;

/// Demo topics, ids 0..8 in this order.
pub const MOCK_TOPICS: [&str; 8] = [
    "Soccer",
    "Food",
    "StockMarket",
    "Travel",
    "Fashion",
    "Technology",
    "Music",
    "Art",
];

/// Classifier that ignores its input and draws each label independently.
pub struct MockClassifier {
    n_labels: usize,
    probability: f64,
    rng: Mutex<StdRng>,
}

impl MockClassifier {
    pub fn new(n_labels: usize) -> Self {
        Self::with_seed(n_labels, rand::random())
    }

    /// Deterministic variant for tests.
    pub fn with_seed(n_labels: usize, seed: u64) -> Self {
        Self {
            n_labels,
            probability: 0.5,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Probability that any single label is switched on (clamped to 0..=1).
    pub fn with_probability(mut self, probability: f64) -> Self {
        self.probability = probability.clamp(0.0, 1.0);
        self
    }
}

impl Classifier for MockClassifier {
    fn predict(&self, features: &[FeatureVector]) -> Result<Vec<LabelVector>, PipelineError> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|e| PipelineError::Inference(format!("mock rng lock poisoned: {e}")))?;
        Ok(features
            .iter()
            .map(|_| {
                (0..self.n_labels)
                    .map(|_| u8::from(rng.random_bool(self.probability)))
                    .collect()
            })
            .collect())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Predictor over the demo label space; topic i maps to `[MOCK_TOPICS[i]]`.
pub struct MockPredictor {
    classifier: MockClassifier,
    codec: LabelCodec,
    mapping: TopicMapping,
}

impl MockPredictor {
    pub fn new() -> Self {
        Self::with_classifier(MockClassifier::new(MOCK_TOPICS.len()))
    }

    pub fn with_classifier(classifier: MockClassifier) -> Self {
        let codec = LabelCodec::from_classes((0..MOCK_TOPICS.len() as u32).map(TopicId));
        let entries: BTreeMap<TopicId, Vec<String>> = MOCK_TOPICS
            .iter()
            .enumerate()
            .map(|(i, name)| (TopicId(i as u32), vec![name.to_string()]))
            .collect();
        Self {
            classifier,
            codec,
            mapping: TopicMapping::new(entries),
        }
    }
}

impl Default for MockPredictor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TopicPredictor for MockPredictor {
    async fn predict(&self, texts: &[String]) -> Result<Vec<PredictionResult>, PipelineError> {
        // The mock classifier never reads features; one empty row per text
        // keeps the batch sizes aligned.
        let features: Vec<FeatureVector> = vec![Vec::new(); texts.len()];
        let labels = self.classifier.predict(&features)?;
        assemble(texts, &labels, &self.codec, &self.mapping)
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
