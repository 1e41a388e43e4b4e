// Preprocessing: fit the vectorizer and label codec on a labelled corpus,
// build the topic mapping, and produce the training matrix the external
// trainer consumes.

use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use super::corpus::CorpusRow;
use crate::error::PipelineError;
use crate::features::vectorizer::{CountVectorizer, VectorizerParams};
use crate::features::FeatureVector;
use crate::labels::codec::LabelCodec;
use crate::labels::mapping::{TopicMapping, TopicRow};
use crate::labels::{LabelVector, TopicId};

/// Everything preprocessing produces for one corpus.
pub struct Prepared {
    pub vectorizer: CountVectorizer,
    pub codec: LabelCodec,
    pub mapping: TopicMapping,
    pub features: Vec<FeatureVector>,
    pub labels: Vec<LabelVector>,
}

pub fn prepare(
    corpus: &[CorpusRow],
    topic_rows: &[TopicRow],
    params: VectorizerParams,
) -> Result<Prepared, PipelineError> {
    if corpus.is_empty() {
        return Err(PipelineError::InvalidRequest(
            "corpus is empty, nothing to fit".to_string(),
        ));
    }

    let texts: Vec<String> = corpus.iter().map(|row| row.text.clone()).collect();
    let topic_sets: Vec<Vec<TopicId>> = corpus.iter().map(|row| row.topics.clone()).collect();

    let vectorizer = CountVectorizer::fit(&texts, params)?;
    let features = vectorizer.transform(&texts)?;

    let codec = LabelCodec::fit(topic_sets.iter().map(Vec::as_slice));
    if codec.is_empty() {
        return Err(PipelineError::InvalidRequest(
            "corpus rows carry no topic labels".to_string(),
        ));
    }
    let labels = codec.encode(&topic_sets)?;

    let mapping = TopicMapping::from_rows(topic_rows);

    info!(
        documents = corpus.len(),
        features = vectorizer.n_features(),
        labels = codec.len(),
        mapped_topics = mapping.len(),
        "Preprocessing complete"
    );

    Ok(Prepared {
        vectorizer,
        codec,
        mapping,
        features,
        labels,
    })
}

/// Write the training matrix as CSV: one column per vocabulary term
/// (`f0..fN`), then one column per class named by its topic id.
pub fn write_training_matrix(
    path: &Path,
    features: &[FeatureVector],
    labels: &[LabelVector],
    codec: &LabelCodec,
    show_progress: bool,
) -> Result<()> {
    if features.len() != labels.len() {
        return Err(PipelineError::shape("training matrix", features.len(), labels.len()).into());
    }

    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);

    let n_features = features.first().map_or(0, Vec::len);
    let header: Vec<String> = (0..n_features)
        .map(|i| format!("f{i}"))
        .chain(codec.classes().iter().map(|id| id.0.to_string()))
        .collect();
    writeln!(out, "{}", header.join(","))?;

    let pb = if show_progress {
        let pb = ProgressBar::new(features.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("    [{bar:40.cyan/blue}] {pos}/{len} rows ({eta})")?
                .progress_chars("=> "),
        );
        Some(pb)
    } else {
        None
    };

    for (row, label) in features.iter().zip(labels) {
        let cells: Vec<String> = row
            .iter()
            .map(|v| format!("{v}"))
            .chain(label.iter().map(|b| b.to_string()))
            .collect();
        writeln!(out, "{}", cells.join(","))?;
        if let Some(ref pb) = pb {
            pb.inc(1);
        }
    }
    out.flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    info!(path = %path.display(), rows = features.len(), "Wrote training matrix");
    Ok(())
}
