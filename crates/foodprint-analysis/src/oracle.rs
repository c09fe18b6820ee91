//! Consulting the classifier as a best-effort yes/no oracle.

use foodprint_inference::{Classification, ClassifierHandle, InferenceError};

use crate::error::{PipelineError, PipelineWarning, Stage};

pub(crate) enum Consultation {
    Answer(Classification),
    Unavailable(PipelineWarning),
}

/// Ask one question. Credential failures are fatal; anything else degrades
/// to a warning so the caller can use its static fallback.
pub(crate) async fn consult(
    handle: &ClassifierHandle,
    stage: Stage,
    prompt: &str,
) -> Result<Consultation, PipelineError> {
    let classifier = match handle.acquire().await {
        Ok(c) => c,
        Err(e) => return recover(stage, e).map(Consultation::Unavailable),
    };
    match classifier.infer(prompt).await {
        Ok(answer) => {
            tracing::debug!(%stage, prompt, label = ?answer.label, score = answer.score, "classifier answered");
            Ok(Consultation::Answer(answer))
        }
        Err(e) => recover(stage, e).map(Consultation::Unavailable),
    }
}

/// Turn an inference failure into a warning, or a configuration error when
/// the credential is at fault.
pub(crate) fn recover(stage: Stage, error: InferenceError) -> Result<PipelineWarning, PipelineError> {
    if error.is_credential_error() {
        return Err(PipelineError::Configuration(error.to_string()));
    }
    tracing::warn!(%stage, error = %error, "classifier unavailable, using heuristic fallback");
    Ok(PipelineWarning::ModelUnavailable {
        stage,
        reason: error.to_string(),
    })
}
