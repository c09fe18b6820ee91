//! Text-classification inference for produce questions.
//!
//! Wraps a hosted binary classifier behind the [`Classifier`] trait and a
//! lazily loaded [`ClassifierHandle`] shared by every consumer in the process.

pub mod classifier;
pub mod error;
pub mod handle;
pub mod hf;
pub mod types;

pub use classifier::Classifier;
pub use error::InferenceError;
pub use handle::{ClassifierHandle, HuggingFaceLoader, ModelLoader};
pub use hf::HuggingFaceClient;
pub use types::{Classification, InferenceConfig, Label};
