// Decoding pipeline: composes the label codec and the topic mapping to turn
// raw classifier output into `PredictionResult`s.
//
// Position i of the output always belongs to texts[i]. A length mismatch
// between texts and label vectors means an upstream stage broke the 1:1
// batch order and is reported, never patched over.

use crate::error::PipelineError;
use crate::labels::codec::LabelCodec;
use crate::labels::mapping::TopicMapping;
use crate::labels::LabelVector;

use super::PredictionResult;

pub fn assemble(
    texts: &[String],
    label_vectors: &[LabelVector],
    codec: &LabelCodec,
    mapping: &TopicMapping,
) -> Result<Vec<PredictionResult>, PipelineError> {
    if texts.len() != label_vectors.len() {
        return Err(PipelineError::shape(
            "assemble",
            texts.len(),
            label_vectors.len(),
        ));
    }

    let decoded = codec.decode(label_vectors)?;

    Ok(texts
        .iter()
        .zip(decoded)
        .map(|(text, ids)| PredictionResult {
            input_text: text.clone(),
            predicted_topics: ids.iter().map(ToString::to_string).collect(),
            decoded_topics: mapping.lookup(&ids),
        })
        .collect())
}
