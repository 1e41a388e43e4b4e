// Topic mapping: static lookup from a topic id to its keyword list.
//
// The mapping is built during preprocessing from a table of
// `topic` / `terms` rows, e.g. `{"topic": "Topic 3", "terms": "goal,match,league"}`.
// Ids the mapping doesn't know about resolve to ["Unknown"]; the model and the
// mapping can come from different snapshots and that's tolerated.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::TopicId;

/// Keyword list returned for ids missing from the mapping.
pub const UNKNOWN_TOPIC: &str = "Unknown";

/// One row of the topic-mapping source table.
#[derive(Debug, Clone, Deserialize)]
pub struct TopicRow {
    /// Topic label, `"Topic <n>"` or a bare number
    pub topic: String,
    /// Comma-separated keywords
    pub terms: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicMapping {
    entries: BTreeMap<TopicId, Vec<String>>,
}

impl TopicMapping {
    pub fn new(entries: BTreeMap<TopicId, Vec<String>>) -> Self {
        Self { entries }
    }

    /// Build the mapping from source rows. Rows whose topic label can't be
    /// parsed are skipped with a warning; a later row for the same id wins.
    pub fn from_rows(rows: &[TopicRow]) -> Self {
        let mut entries = BTreeMap::new();
        for row in rows {
            let id = match row.topic.parse::<TopicId>() {
                Ok(id) => id,
                Err(e) => {
                    warn!(topic = %row.topic, error = %e, "Skipping topic mapping row");
                    continue;
                }
            };
            let keywords: Vec<String> = row
                .terms
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect();
            entries.insert(id, keywords);
        }
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: TopicId) -> Option<&[String]> {
        self.entries.get(&id).map(Vec::as_slice)
    }

    /// Resolve each id to its keywords, or `["Unknown"]`. Never fails.
    pub fn lookup(&self, ids: &[TopicId]) -> Vec<Vec<String>> {
        ids.iter()
            .map(|id| match self.entries.get(id) {
                Some(keywords) => keywords.clone(),
                None => vec![UNKNOWN_TOPIC.to_string()],
            })
            .collect()
    }

    /// Ids in `ids` that have no entry. Used to warn at load time when the
    /// mapping covers less of the label space than the codec.
    pub fn missing<'a>(&self, ids: &'a [TopicId]) -> Vec<&'a TopicId> {
        ids.iter().filter(|id| !self.entries.contains_key(id)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(topic: &str, terms: &str) -> TopicRow {
        TopicRow {
            topic: topic.to_string(),
            terms: terms.to_string(),
        }
    }

    #[test]
    fn test_from_rows_splits_terms() {
        let mapping = TopicMapping::from_rows(&[row("Topic 3", "goal, match ,league,")]);
        assert_eq!(
            mapping.get(TopicId(3)).unwrap(),
            &["goal".to_string(), "match".to_string(), "league".to_string()]
        );
    }

    #[test]
    fn test_from_rows_skips_bad_labels() {
        let mapping = TopicMapping::from_rows(&[row("misc", "a"), row("Topic 1", "b")]);
        assert_eq!(mapping.len(), 1);
    }

    #[test]
    fn test_lookup_unknown_falls_back() {
        let mapping = TopicMapping::from_rows(&[row("Topic 0", "goal")]);
        let looked_up = mapping.lookup(&[TopicId(0), TopicId(9)]);
        assert_eq!(looked_up, vec![vec!["goal".to_string()], vec!["Unknown".to_string()]]);
    }

    #[test]
    fn test_serializes_with_numeric_keys() {
        let mapping = TopicMapping::from_rows(&[row("Topic 2", "food,recipe")]);
        let json = serde_json::to_string(&mapping).unwrap();
        assert_eq!(json, r#"{"2":["food","recipe"]}"#);
        let back: TopicMapping = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mapping);
    }
}
