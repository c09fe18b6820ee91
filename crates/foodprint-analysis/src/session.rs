//! One consumer's sequence of submissions against a shared pipeline.
//!
//! Each submission takes a new generation number. A result whose generation
//! is no longer current is discarded, so a slow earlier query never
//! overwrites a newer one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use foodprint_core::ProduceQuery;
use tokio::sync::watch;

use crate::error::PipelineError;
use crate::pipeline::{current_month, Analysis, PipelineState, SustainabilityPipeline};

#[derive(Default)]
struct Slot {
    last_query: Option<ProduceQuery>,
    result: Option<Analysis>,
}

pub struct AnalysisSession {
    pipeline: Arc<SustainabilityPipeline>,
    generation: AtomicU64,
    state: watch::Sender<PipelineState>,
    slot: Mutex<Slot>,
}

impl AnalysisSession {
    #[must_use]
    pub fn new(pipeline: Arc<SustainabilityPipeline>) -> Self {
        let (state, _) = watch::channel(PipelineState::Idle);
        Self {
            pipeline,
            generation: AtomicU64::new(0),
            state,
            slot: Mutex::new(Slot::default()),
        }
    }

    /// Observe state transitions of the current submission.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PipelineState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn state(&self) -> PipelineState {
        *self.state.borrow()
    }

    /// The latest completed analysis, if any.
    #[must_use]
    pub fn result(&self) -> Option<Analysis> {
        self.lock().result.clone()
    }

    /// The query kept for [`AnalysisSession::retry`].
    #[must_use]
    pub fn last_query(&self) -> Option<ProduceQuery> {
        self.lock().last_query.clone()
    }

    /// Analyse `query` for `month` (current month when `None`), replacing any
    /// earlier submission.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Superseded`] if a newer submission or a reset
    /// happened while this one ran, otherwise the pipeline's own error.
    pub async fn submit(
        &self,
        query: ProduceQuery,
        month: Option<u8>,
    ) -> Result<Analysis, PipelineError> {
        let generation = {
            let mut slot = self.lock();
            slot.last_query = Some(query.clone());
            self.generation.fetch_add(1, Ordering::SeqCst) + 1
        };

        let month = month.unwrap_or_else(current_month);
        let outcome = self
            .pipeline
            .run(&query, month, |state| {
                // Held across the check and the send so a reset cannot land between them.
                let _slot = self.lock();
                if self.generation.load(Ordering::SeqCst) == generation {
                    self.state.send_replace(state);
                }
            })
            .await;

        let mut slot = self.lock();
        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(generation, "discarding superseded analysis");
            return Err(PipelineError::Superseded);
        }
        if let Ok(analysis) = &outcome {
            slot.result = Some(analysis.clone());
        }
        outcome
    }

    /// Rerun the last submitted query.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::NothingToRetry`] if nothing was submitted
    /// since the last reset, otherwise as [`AnalysisSession::submit`].
    pub async fn retry(&self, month: Option<u8>) -> Result<Analysis, PipelineError> {
        let query = self.last_query().ok_or(PipelineError::NothingToRetry)?;
        self.submit(query, month).await
    }

    /// Discard the current result and any in-flight submission, and return
    /// to `Idle`.
    pub fn reset(&self) {
        let mut slot = self.lock();
        self.generation.fetch_add(1, Ordering::SeqCst);
        slot.result = None;
        slot.last_query = None;
        self.state.send_replace(PipelineState::Idle);
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
