// Trained artifact layout and persistence.
//
// One artifact directory holds everything a training run produced:
//   manifest.json         run id, timestamp, feature and label widths
//   vectorizer.json       fitted count vectorizer
//   label_classes.json    label codec (canonical class order)
//   topic_mapping.json    topic id -> keywords
//   classifier.onnx       exported classifier graph (written by the trainer)
//
// The files are versioned together: the manifest's widths must agree with
// the vectorizer and the codec or the bundle refuses to load. The default
// directory lives under the platform data dir (~/.local/share/topicast/artifacts
// on Linux).

pub mod bundle;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::PipelineError;
use crate::features::vectorizer::CountVectorizer;
use crate::labels::codec::LabelCodec;
use crate::labels::mapping::TopicMapping;

pub const MANIFEST_FILE: &str = "manifest.json";
pub const VECTORIZER_FILE: &str = "vectorizer.json";
pub const LABEL_CLASSES_FILE: &str = "label_classes.json";
pub const TOPIC_MAPPING_FILE: &str = "topic_mapping.json";
pub const CLASSIFIER_FILE: &str = "classifier.onnx";

/// Training matrix handed to the external trainer (features then labels).
pub const TRAINING_MATRIX_FILE: &str = "preprocessed_data.csv";

/// Every file a loadable bundle needs, in load order.
pub const BUNDLE_FILES: [&str; 5] = [
    MANIFEST_FILE,
    VECTORIZER_FILE,
    LABEL_CLASSES_FILE,
    TOPIC_MAPPING_FILE,
    CLASSIFIER_FILE,
];

/// Returns the default artifact directory.
pub fn default_artifact_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("topicast")
        .join("artifacts")
}

/// Bundle files that are not present in `dir`.
pub fn missing_files(dir: &Path) -> Vec<&'static str> {
    BUNDLE_FILES
        .iter()
        .copied()
        .filter(|f| !dir.join(f).exists())
        .collect()
}

/// Check whether every file of a bundle exists.
pub fn artifact_files_present(dir: &Path) -> bool {
    missing_files(dir).is_empty()
}

/// Identifies the training run that produced a set of artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub run_id: String,
    pub created_at: DateTime<Utc>,
    pub n_features: usize,
    pub n_labels: usize,
}

impl Manifest {
    pub fn new(n_features: usize, n_labels: usize) -> Self {
        let created_at = Utc::now();
        Self {
            run_id: created_at.format("run-%Y%m%d-%H%M%S").to_string(),
            created_at,
            n_features,
            n_labels,
        }
    }
}

/// Write the preprocessing outputs (everything except the classifier).
pub fn save_preprocessing(
    dir: &Path,
    vectorizer: &CountVectorizer,
    codec: &LabelCodec,
    mapping: &TopicMapping,
) -> Result<Manifest> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create artifact directory: {}", dir.display()))?;

    let manifest = Manifest::new(vectorizer.n_features(), codec.len());
    write_json(&dir.join(MANIFEST_FILE), &manifest)?;
    write_json(&dir.join(VECTORIZER_FILE), vectorizer)?;
    write_json(&dir.join(LABEL_CLASSES_FILE), codec)?;
    write_json(&dir.join(TOPIC_MAPPING_FILE), mapping)?;

    info!(
        dir = %dir.display(),
        run_id = %manifest.run_id,
        n_features = manifest.n_features,
        n_labels = manifest.n_labels,
        "Saved preprocessing artifacts"
    );
    Ok(manifest)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

/// Read one JSON artifact. `on_error` picks the failure kind so a broken
/// vectorizer reports as a feature error and so on.
pub(crate) fn read_json<T: DeserializeOwned>(
    path: &Path,
    on_error: fn(String) -> PipelineError,
) -> Result<T, PipelineError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| on_error(format!("failed to read {}: {e}", path.display())))?;
    serde_json::from_str(&raw).map_err(|e| on_error(format!("failed to parse {}: {e}", path.display())))
}

/// Load just the manifest, for status display.
pub fn load_manifest(dir: &Path) -> Result<Manifest, PipelineError> {
    read_json(&dir.join(MANIFEST_FILE), PipelineError::Artifact)
}
