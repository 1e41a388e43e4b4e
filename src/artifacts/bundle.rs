// ArtifactBundle: classifier, vectorizer, label codec and topic mapping,
// loaded together as one immutable value.
//
// The bundle is built once at startup and shared behind an Arc by every
// request. There is no partially loaded state: `load` either returns a
// complete bundle or an error.

use std::path::Path;

use tracing::warn;

use super::{read_json, Manifest, CLASSIFIER_FILE, LABEL_CLASSES_FILE, MANIFEST_FILE};
use super::{TOPIC_MAPPING_FILE, VECTORIZER_FILE};
use crate::engine::traits::Classifier;
use crate::error::PipelineError;
use crate::features::vectorizer::CountVectorizer;
use crate::labels::codec::LabelCodec;
use crate::labels::mapping::TopicMapping;
use crate::labels::LabelVector;
use crate::pipeline::decode::assemble;
use crate::pipeline::PredictionResult;

pub struct ArtifactBundle {
    classifier: Box<dyn Classifier>,
    vectorizer: CountVectorizer,
    codec: LabelCodec,
    mapping: TopicMapping,
}

impl std::fmt::Debug for ArtifactBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactBundle")
            .field("classifier", &self.classifier.name())
            .field("n_features", &self.vectorizer.n_features())
            .field("n_labels", &self.codec.len())
            .field("mapped_topics", &self.mapping.len())
            .finish()
    }
}

impl ArtifactBundle {
    /// Assemble a bundle from already-loaded parts.
    ///
    /// The vectorizer must be fitted and the codec must have at least one
    /// class. Topics the mapping doesn't cover are logged, not rejected.
    pub fn from_parts(
        classifier: Box<dyn Classifier>,
        vectorizer: CountVectorizer,
        codec: LabelCodec,
        mapping: TopicMapping,
    ) -> Result<Self, PipelineError> {
        if !vectorizer.is_fitted() {
            return Err(PipelineError::Feature(
                "vectorizer artifact has an empty vocabulary".to_string(),
            ));
        }
        if codec.is_empty() {
            return Err(PipelineError::Artifact(
                "label codec has no classes".to_string(),
            ));
        }

        let unmapped = mapping.missing(codec.classes());
        if !unmapped.is_empty() {
            warn!(
                unmapped = unmapped.len(),
                classes = codec.len(),
                "Topic mapping does not cover every class; those topics will decode as Unknown"
            );
        }

        Ok(Self {
            classifier,
            vectorizer,
            codec,
            mapping,
        })
    }

    /// Load a full bundle from an artifact directory with the ONNX classifier.
    #[cfg(feature = "onnx")]
    pub fn load(dir: &Path) -> Result<Self, PipelineError> {
        let (manifest, vectorizer, codec, mapping) = load_checked_parts(dir)?;
        let classifier = crate::engine::onnx::OnnxClassifier::load(
            &dir.join(CLASSIFIER_FILE),
            manifest.n_features,
            manifest.n_labels,
        )?;
        let bundle = Self::from_parts(Box::new(classifier), vectorizer, codec, mapping)?;
        tracing::info!(
            dir = %dir.display(),
            run_id = %manifest.run_id,
            n_features = manifest.n_features,
            n_labels = manifest.n_labels,
            "Loaded artifact bundle"
        );
        Ok(bundle)
    }

    /// Without ONNX support there is no way to load the trained classifier.
    #[cfg(not(feature = "onnx"))]
    pub fn load(dir: &Path) -> Result<Self, PipelineError> {
        load_checked_parts(dir)?;
        Err(PipelineError::ModelNotLoaded(format!(
            "cannot load {}: built without the `onnx` feature",
            dir.join(CLASSIFIER_FILE).display()
        )))
    }

    /// Load the bundle's vectorizer, codec and mapping with a caller-supplied
    /// classifier (e.g. a mock, or a model served some other way).
    pub fn load_with_classifier(
        dir: &Path,
        classifier: Box<dyn Classifier>,
    ) -> Result<Self, PipelineError> {
        let (_manifest, vectorizer, codec, mapping) = load_checked_parts(dir)?;
        Self::from_parts(classifier, vectorizer, codec, mapping)
    }

    pub fn vectorizer(&self) -> &CountVectorizer {
        &self.vectorizer
    }

    pub fn codec(&self) -> &LabelCodec {
        &self.codec
    }

    pub fn mapping(&self) -> &TopicMapping {
        &self.mapping
    }

    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }

    /// Transform and classify, returning raw label vectors.
    pub fn predict_labels(&self, texts: &[String]) -> Result<Vec<LabelVector>, PipelineError> {
        let features = self.vectorizer.transform(texts)?;
        let labels = self.classifier.predict(&features)?;
        if labels.len() != texts.len() {
            return Err(PipelineError::shape(
                "classifier batch",
                texts.len(),
                labels.len(),
            ));
        }
        Ok(labels)
    }

    /// Full inference contract: transform -> predict -> decode -> map.
    pub fn predict(&self, texts: &[String]) -> Result<Vec<PredictionResult>, PipelineError> {
        let labels = self.predict_labels(texts)?;
        assemble(texts, &labels, &self.codec, &self.mapping)
    }
}

type Parts = (Manifest, CountVectorizer, LabelCodec, TopicMapping);

/// Read the JSON artifacts and check them against the manifest.
fn load_checked_parts(dir: &Path) -> Result<Parts, PipelineError> {
    let manifest: Manifest = read_json(&dir.join(MANIFEST_FILE), PipelineError::Artifact)?;
    let vectorizer: CountVectorizer = read_json(&dir.join(VECTORIZER_FILE), PipelineError::Feature)?;
    let codec: LabelCodec = read_json(&dir.join(LABEL_CLASSES_FILE), PipelineError::Artifact)?;
    let mapping: TopicMapping = read_json(&dir.join(TOPIC_MAPPING_FILE), PipelineError::Artifact)?;

    if vectorizer.n_features() != manifest.n_features {
        return Err(PipelineError::shape(
            "vectorizer vocabulary",
            manifest.n_features,
            vectorizer.n_features(),
        ));
    }
    if codec.len() != manifest.n_labels {
        return Err(PipelineError::shape(
            "label classes",
            manifest.n_labels,
            codec.len(),
        ));
    }

    Ok((manifest, vectorizer, codec, mapping))
}
