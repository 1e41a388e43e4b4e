// Feature extraction: turns raw text into fixed-width count vectors using
// the vocabulary fit during preprocessing.

pub mod vectorizer;

/// Token counts for one input text, one slot per vocabulary term.
pub type FeatureVector = Vec<f32>;
