// Inference engines: trait-based abstraction for swappable backends.
//
// `Classifier` implementations run inside the artifact bundle (ONNX, mock).
// `TopicPredictor` implementations sit behind the HTTP API: the remote
// predictor is the default, local and mock are opt-in.

pub mod local;
pub mod mock;
#[cfg(feature = "onnx")]
pub mod onnx;
pub mod remote;
pub mod traits;
