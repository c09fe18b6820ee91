//! Lazily loaded, process-wide classifier handle.
//!
//! The first caller triggers the load; concurrent callers await that single
//! in-flight load instead of starting their own, and share its outcome
//! whether it succeeds or fails. A successful load is kept for the life of
//! the handle. A failure is handed only to the callers that were waiting on
//! it, so a later call tries again.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::{Mutex, OnceCell};

use crate::classifier::Classifier;
use crate::error::InferenceError;
use crate::hf::HuggingFaceClient;
use crate::types::InferenceConfig;

/// Longest single sleep while waiting for a cold model.
const MAX_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Prompt used to wake the model during loading.
const WARMUP_PROMPT: &str = "Fresh produce is in season.";

#[async_trait]
pub trait ModelLoader: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn Classifier>, InferenceError>;
}

/// Loads the Hugging Face classifier, polling until the hosted model is warm.
pub struct HuggingFaceLoader {
    config: InferenceConfig,
}

impl HuggingFaceLoader {
    #[must_use]
    pub fn new(config: InferenceConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ModelLoader for HuggingFaceLoader {
    async fn load(&self) -> Result<Arc<dyn Classifier>, InferenceError> {
        let client = HuggingFaceClient::new(&self.config)?;
        let deadline = Instant::now() + Duration::from_secs(self.config.load_timeout_secs);

        loop {
            match client.infer(WARMUP_PROMPT).await {
                Ok(_) => {
                    tracing::info!(model = %self.config.model, "classifier model ready");
                    return Ok(Arc::new(client));
                }
                Err(InferenceError::ModelLoading { estimated_secs }) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(InferenceError::ModelUnavailable(format!(
                            "model {} still loading after {}s",
                            self.config.model, self.config.load_timeout_secs
                        )));
                    }
                    let wait = Duration::from_secs_f64(estimated_secs.clamp(0.5, 600.0))
                        .min(MAX_POLL_INTERVAL)
                        .min(deadline - now);
                    tracing::info!(
                        model = %self.config.model,
                        wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
                        "classifier model loading, waiting"
                    );
                    tokio::time::sleep(wait).await;
                }
                Err(e) if e.is_credential_error() => return Err(e),
                Err(e) => {
                    return Err(InferenceError::ModelUnavailable(format!(
                        "model {} failed to load: {e}",
                        self.config.model
                    )))
                }
            }
        }
    }
}

/// Outcome of the most recent failed load, replayed to its waiters.
#[derive(Debug, Clone)]
struct LoadFailure {
    credential: bool,
    message: String,
}

impl LoadFailure {
    fn from_error(error: &InferenceError) -> Self {
        Self {
            credential: error.is_credential_error(),
            message: error.to_string(),
        }
    }

    fn to_error(&self) -> InferenceError {
        if self.credential {
            InferenceError::Unauthorized(self.message.clone())
        } else {
            InferenceError::ModelUnavailable(self.message.clone())
        }
    }
}

/// Shared, lazily initialized classifier.
///
/// Build one per process and hand clones of the `Arc` to whoever needs it.
pub struct ClassifierHandle {
    loader: Option<Arc<dyn ModelLoader>>,
    cell: OnceCell<Arc<dyn Classifier>>,
    /// Completed load attempts. A caller that saw N before queueing and
    /// finds more once it holds the lock was waiting on that attempt.
    attempts: AtomicU64,
    last_failure: Mutex<Option<LoadFailure>>,
}

impl ClassifierHandle {
    #[must_use]
    pub fn new(loader: Arc<dyn ModelLoader>) -> Self {
        Self::with_parts(Some(loader), OnceCell::new())
    }

    /// A handle around an already constructed classifier.
    #[must_use]
    pub fn ready(classifier: Arc<dyn Classifier>) -> Self {
        Self::with_parts(None, OnceCell::from(classifier))
    }

    /// A handle with no model at all; every `acquire` reports `ModelUnavailable`.
    #[must_use]
    pub fn unavailable() -> Self {
        Self::with_parts(None, OnceCell::new())
    }

    fn with_parts(
        loader: Option<Arc<dyn ModelLoader>>,
        cell: OnceCell<Arc<dyn Classifier>>,
    ) -> Self {
        Self {
            loader,
            cell,
            attempts: AtomicU64::new(0),
            last_failure: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }

    /// Get the classifier, loading it on first use.
    ///
    /// # Errors
    ///
    /// Returns the loader's error (also to every caller that was waiting on
    /// the same attempt), or [`InferenceError::ModelUnavailable`] for a
    /// handle built with [`ClassifierHandle::unavailable`].
    pub async fn acquire(&self) -> Result<Arc<dyn Classifier>, InferenceError> {
        if let Some(classifier) = self.cell.get() {
            return Ok(Arc::clone(classifier));
        }
        let Some(loader) = &self.loader else {
            return Err(InferenceError::ModelUnavailable(
                "no classifier configured (offline mode)".to_string(),
            ));
        };

        let seen = self.attempts.load(Ordering::SeqCst);
        let mut last_failure = self.last_failure.lock().await;

        if let Some(classifier) = self.cell.get() {
            return Ok(Arc::clone(classifier));
        }
        if self.attempts.load(Ordering::SeqCst) != seen {
            if let Some(failure) = last_failure.as_ref() {
                tracing::debug!(error = %failure.message, "sharing failed classifier load");
                return Err(failure.to_error());
            }
        }

        let outcome = loader.load().await;
        self.attempts.fetch_add(1, Ordering::SeqCst);
        match outcome {
            Ok(classifier) => {
                *last_failure = None;
                Ok(Arc::clone(self.cell.get_or_init(|| async { classifier }).await))
            }
            Err(e) => {
                tracing::warn!(error = %e, "classifier load failed");
                *last_failure = Some(LoadFailure::from_error(&e));
                Err(e)
            }
        }
    }
}
