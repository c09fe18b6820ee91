use async_trait::async_trait;

use crate::error::InferenceError;
use crate::types::Classification;

/// A confidence-scored yes/no oracle over free-text prompts.
///
/// Answers are best-effort; callers consult their static tables first and
/// treat the classifier as a fallback.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn infer(&self, prompt: &str) -> Result<Classification, InferenceError>;
}
