// Multi-label codec: bidirectional mapping between sets of topic ids and
// fixed-width binary label vectors.
//
// The class order is fixed when the codec is fit (ascending topic id) and
// is persisted alongside the classifier so inference decodes positions
// exactly the way training encoded them.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::{LabelVector, TopicId};
use crate::error::PipelineError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelCodec {
    /// Canonical topic order; position i of a label vector refers to classes[i].
    classes: Vec<TopicId>,
}

impl LabelCodec {
    /// Fit the codec on the topic sets of a training corpus.
    pub fn fit<'a, I>(topic_sets: I) -> Self
    where
        I: IntoIterator<Item = &'a [TopicId]>,
    {
        let classes: BTreeSet<TopicId> = topic_sets
            .into_iter()
            .flat_map(|set| set.iter().copied())
            .collect();
        Self {
            classes: classes.into_iter().collect(),
        }
    }

    /// Build a codec from an explicit class list. Duplicates are removed and
    /// the list is sorted so the canonical order does not depend on input order.
    pub fn from_classes(classes: impl IntoIterator<Item = TopicId>) -> Self {
        let classes: BTreeSet<TopicId> = classes.into_iter().collect();
        Self {
            classes: classes.into_iter().collect(),
        }
    }

    pub fn classes(&self) -> &[TopicId] {
        &self.classes
    }

    /// Width of every label vector this codec produces or accepts.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Encode topic sets as label vectors. Training-time only.
    pub fn encode(&self, topic_sets: &[Vec<TopicId>]) -> Result<Vec<LabelVector>, PipelineError> {
        let positions: HashMap<TopicId, usize> = self
            .classes
            .iter()
            .enumerate()
            .map(|(i, id)| (*id, i))
            .collect();

        topic_sets
            .iter()
            .map(|set| {
                let mut vector = vec![0u8; self.classes.len()];
                for id in set {
                    let pos = positions
                        .get(id)
                        .ok_or(PipelineError::UnknownLabel(id.0))?;
                    vector[*pos] = 1;
                }
                Ok(vector)
            })
            .collect()
    }

    /// Decode label vectors back to topic ids in canonical order.
    ///
    /// A zero vector decodes to an empty list. A vector of the wrong width
    /// is a shape mismatch, never truncated.
    pub fn decode(&self, vectors: &[LabelVector]) -> Result<Vec<Vec<TopicId>>, PipelineError> {
        vectors
            .iter()
            .map(|vector| {
                if vector.len() != self.classes.len() {
                    return Err(PipelineError::shape(
                        "label decode",
                        self.classes.len(),
                        vector.len(),
                    ));
                }
                Ok(vector
                    .iter()
                    .zip(&self.classes)
                    .filter(|(bit, _)| **bit != 0)
                    .map(|(_, id)| *id)
                    .collect())
            })
            .collect()
    }
}
