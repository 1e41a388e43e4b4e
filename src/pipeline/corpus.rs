// Labelled corpus and topic-table readers (JSON lines).
//
// Corpus rows look like `{"text": "...", "topics": [0, 3]}`. The column
// names of the upstream dataset export (`lemmatized_tokens`, `top_topics`)
// are accepted as aliases so an export can be fed in unchanged.

use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::labels::TopicId;

#[derive(Debug, Clone, Deserialize)]
pub struct CorpusRow {
    #[serde(alias = "lemmatized_tokens")]
    pub text: String,
    #[serde(alias = "top_topics", default)]
    pub topics: Vec<TopicId>,
}

/// Read every non-blank line of `path` as one JSON value.
pub fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut rows = Vec::new();
    for (i, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read {}", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        let row = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}: invalid row", path.display(), i + 1))?;
        rows.push(row);
    }
    Ok(rows)
}
