// Topicast: multi-label text topic classification.
//
// This is the library root. Each module corresponds to one stage of the
// prediction pipeline or to the service around it.

pub mod artifacts;
pub mod config;
pub mod engine;
pub mod error;
pub mod features;
pub mod labels;
pub mod output;
pub mod pipeline;
pub mod status;
pub mod web;
