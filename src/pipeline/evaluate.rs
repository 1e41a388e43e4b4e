// Exact-match evaluation of a bundle against a labelled corpus.
//
// A row counts as correct only when every label matches (subset accuracy),
// the same score the training job reports when it registers a model.

use serde::Serialize;

use super::corpus::CorpusRow;
use crate::artifacts::bundle::ArtifactBundle;
use crate::error::PipelineError;
use crate::labels::{LabelVector, TopicId};

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub rows: usize,
    pub exact_matches: usize,
    pub accuracy: f64,
}

/// Fraction of rows whose predicted label vector equals the expected one.
/// Returns 0.0 for an empty batch.
pub fn subset_accuracy(
    predicted: &[LabelVector],
    expected: &[LabelVector],
) -> Result<f64, PipelineError> {
    if predicted.len() != expected.len() {
        return Err(PipelineError::shape(
            "evaluation",
            expected.len(),
            predicted.len(),
        ));
    }
    if expected.is_empty() {
        return Ok(0.0);
    }
    let matches = count_matches(predicted, expected);
    Ok(matches as f64 / expected.len() as f64)
}

fn count_matches(predicted: &[LabelVector], expected: &[LabelVector]) -> usize {
    predicted
        .iter()
        .zip(expected)
        .filter(|(p, e)| p == e)
        .count()
}

/// Run the bundle over the corpus and compare against its labels.
pub fn evaluate(
    bundle: &ArtifactBundle,
    corpus: &[CorpusRow],
) -> Result<EvaluationReport, PipelineError> {
    let texts: Vec<String> = corpus.iter().map(|row| row.text.clone()).collect();
    let topic_sets: Vec<Vec<TopicId>> = corpus.iter().map(|row| row.topics.clone()).collect();

    // Every expected topic must be part of the trained label space
    let classes = bundle.codec().classes();
    let unknown = topic_sets.iter().enumerate().find_map(|(row, set)| {
        set.iter()
            .find(|id| !classes.contains(*id))
            .map(|id| (row, *id))
    });
    if let Some((row, id)) = unknown {
        return Err(PipelineError::InvalidRequest(format!(
            "corpus row {}: {id} is not in the trained label space ({} classes)",
            row + 1,
            classes.len()
        )));
    }

    let expected = bundle.codec().encode(&topic_sets)?;
    let predicted = bundle.predict_labels(&texts)?;
    let accuracy = subset_accuracy(&predicted, &expected)?;

    Ok(EvaluationReport {
        rows: corpus.len(),
        exact_matches: count_matches(&predicted, &expected),
        accuracy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subset_accuracy_partial() {
        let predicted = vec![vec![1, 0], vec![1, 1], vec![0, 0], vec![0, 1]];
        let expected = vec![vec![1, 0], vec![1, 0], vec![0, 0], vec![1, 1]];
        let acc = subset_accuracy(&predicted, &expected).unwrap();
        assert!((acc - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_subset_accuracy_empty_is_zero() {
        assert_eq!(subset_accuracy(&[], &[]).unwrap(), 0.0);
    }

    #[test]
    fn test_subset_accuracy_length_mismatch() {
        assert!(matches!(
            subset_accuracy(&[vec![1]], &[]),
            Err(PipelineError::ShapeMismatch { .. })
        ));
    }
}
