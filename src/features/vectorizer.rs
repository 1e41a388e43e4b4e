// Count vectorizer: bag-of-words term counts over a fixed vocabulary.
//
// Tokens are runs of two or more word characters, lowercased. At fit time
// the most frequent `max_features` terms are kept (optionally after dropping
// English stop words from the `stop-words` crate). Column indices follow the
// alphabetical order of the kept terms so the vocabulary serializes stably.
//
// The vocabulary is never re-fit at inference time: the same serialized
// vectorizer that produced the training matrix transforms incoming requests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::LazyLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use stop_words::{get, LANGUAGE};
use tracing::info;

use super::FeatureVector;
use crate::error::PipelineError;

static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("valid token pattern"));

/// Default vocabulary cap, matching the size used for the training matrix.
pub const DEFAULT_MAX_FEATURES: usize = 20_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorizerParams {
    /// Maximum vocabulary size
    pub max_features: usize,
    /// Drop English stop words before counting
    pub english_stop_words: bool,
}

impl Default for VectorizerParams {
    fn default() -> Self {
        Self {
            max_features: DEFAULT_MAX_FEATURES,
            english_stop_words: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CountVectorizer {
    pub params: VectorizerParams,
    /// Term -> column index
    vocabulary: BTreeMap<String, usize>,
}

impl CountVectorizer {
    /// Fit a vocabulary on a training corpus.
    pub fn fit(documents: &[String], params: VectorizerParams) -> Result<Self, PipelineError> {
        let stop_words: HashSet<String> = if params.english_stop_words {
            get(LANGUAGE::English).into_iter().collect()
        } else {
            HashSet::new()
        };

        let mut term_counts: HashMap<String, u64> = HashMap::new();
        for doc in documents {
            for token in tokenize(doc) {
                if stop_words.contains(&token) {
                    continue;
                }
                *term_counts.entry(token).or_insert(0) += 1;
            }
        }

        if term_counts.is_empty() {
            return Err(PipelineError::Feature(format!(
                "empty vocabulary after fitting {} documents; documents may only contain stop words",
                documents.len()
            )));
        }

        // Most frequent first, alphabetical among ties
        let mut ranked: Vec<(String, u64)> = term_counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(params.max_features);

        let mut kept: Vec<String> = ranked.into_iter().map(|(term, _)| term).collect();
        kept.sort();
        let vocabulary: BTreeMap<String, usize> = kept
            .into_iter()
            .enumerate()
            .map(|(i, term)| (term, i))
            .collect();

        info!(
            documents = documents.len(),
            vocabulary = vocabulary.len(),
            "Fitted count vectorizer"
        );

        Ok(Self { params, vocabulary })
    }

    /// Number of columns in every feature vector.
    pub fn n_features(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn is_fitted(&self) -> bool {
        !self.vocabulary.is_empty()
    }

    /// Column index for a term, if it's in the vocabulary.
    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    /// Transform texts into count vectors. An empty text yields a zero vector.
    pub fn transform(&self, texts: &[String]) -> Result<Vec<FeatureVector>, PipelineError> {
        if !self.is_fitted() {
            return Err(PipelineError::Feature(
                "vectorizer has no vocabulary; load the fitted artifact first".to_string(),
            ));
        }

        let width = self.vocabulary.len();
        Ok(texts
            .iter()
            .map(|text| {
                let mut row = vec![0.0f32; width];
                for token in tokenize(text) {
                    if let Some(&col) = self.vocabulary.get(&token) {
                        row[col] += 1.0;
                    }
                }
                row
            })
            .collect())
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    TOKEN_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
}
