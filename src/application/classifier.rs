//! Classifier adapter: owns the loaded model and its lifecycle.
//!
//! ```text
//! Unloaded --load()--> Loading --ok--> Ready --release()--> Unloaded
//!                         |
//!                         +--err--> Failed --load()--> Loading
//! ```
//!
//! Loading is single-flight. The first caller performs the fetch and
//! decode; callers arriving while a load is in flight block on a condvar and
//! observe its outcome instead of starting a second load. Inference clones
//! the model `Arc` and runs without holding the state lock.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use crate::domain::{ClassProbabilities, FeatureVector};
use crate::ports::{InferenceError, ModelLoadError, ModelSource, RiskModel};

/// Observable lifecycle state of the adapter.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelState {
    Unloaded,
    Loading,
    Ready,
    Failed(ModelLoadError),
}

impl std::fmt::Display for ModelState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unloaded => write!(f, "unloaded"),
            Self::Loading => write!(f, "loading"),
            Self::Ready => write!(f, "ready"),
            Self::Failed(e) => write!(f, "failed: {e}"),
        }
    }
}

enum Slot<M> {
    Unloaded,
    Loading,
    Ready(Arc<M>),
    Failed(ModelLoadError),
}

impl<M> Slot<M> {
    fn state(&self) -> ModelState {
        match self {
            Self::Unloaded => ModelState::Unloaded,
            Self::Loading => ModelState::Loading,
            Self::Ready(_) => ModelState::Ready,
            Self::Failed(e) => ModelState::Failed(e.clone()),
        }
    }
}

/// Marks a load in progress. Dropped without `settle` (the fetch or decode
/// panicked), it moves the slot to `Failed` and wakes waiters.
struct InFlightLoad<'a, M: RiskModel> {
    adapter: &'a ClassifierAdapter<M>,
    done: bool,
}

impl<M: RiskModel> InFlightLoad<'_, M> {
    fn settle(mut self, outcome: Slot<M>) {
        self.done = true;
        self.adapter.finish_load(outcome);
    }
}

impl<M: RiskModel> Drop for InFlightLoad<'_, M> {
    fn drop(&mut self) {
        if !self.done {
            tracing::error!("Risk model load panicked");
            self.adapter.finish_load(Slot::Failed(ModelLoadError::Corrupt(
                "Model load panicked".to_string(),
            )));
        }
    }
}

/// Loads a `RiskModel` from a `ModelSource` once and serves inference.
pub struct ClassifierAdapter<M: RiskModel> {
    source: Arc<dyn ModelSource>,
    slot: Mutex<Slot<M>>,
    settled: Condvar,
}

impl<M: RiskModel> ClassifierAdapter<M> {
    /// Create an adapter in the `Unloaded` state. Nothing is read yet.
    pub fn new(source: Arc<dyn ModelSource>) -> Self {
        Self {
            source,
            slot: Mutex::new(Slot::Unloaded),
            settled: Condvar::new(),
        }
    }

    // The slot is only ever replaced wholesale, so a poisoned lock still
    // holds a consistent value.
    fn lock(&self) -> MutexGuard<'_, Slot<M>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn state(&self) -> ModelState {
        self.lock().state()
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(*self.lock(), Slot::Ready(_))
    }

    /// Bring the model into memory.
    ///
    /// Returns immediately when already `Ready`. A call made from `Failed`
    /// makes a fresh attempt; a call that waited on someone else's load
    /// reports that load's outcome. May block.
    ///
    /// # Errors
    /// Returns `ModelLoadError` if the artifact cannot be fetched or decoded.
    pub fn load(&self) -> Result<(), ModelLoadError> {
        let mut slot = self.lock();
        let mut waited = false;

        loop {
            let in_flight = match &*slot {
                Slot::Ready(_) => return Ok(()),
                Slot::Loading => true,
                Slot::Failed(e) if waited => return Err(e.clone()),
                Slot::Failed(_) | Slot::Unloaded => false,
            };
            if !in_flight {
                break;
            }
            waited = true;
            slot = self
                .settled
                .wait(slot)
                .unwrap_or_else(PoisonError::into_inner);
        }

        *slot = Slot::Loading;
        drop(slot);
        let guard = InFlightLoad {
            adapter: self,
            done: false,
        };

        let origin = self.source.describe();
        tracing::info!("Loading risk model from {origin}");

        let outcome = self
            .source
            .fetch()
            .and_then(|bytes| M::decode(&bytes))
            .map(Arc::new);

        match outcome {
            Ok(model) => {
                guard.settle(Slot::Ready(model));
                tracing::info!("Risk model ready ({origin})");
                Ok(())
            }
            Err(e) => {
                tracing::error!("Risk model failed to load from {origin}: {e}");
                guard.settle(Slot::Failed(e.clone()));
                Err(e)
            }
        }
    }

    fn finish_load(&self, outcome: Slot<M>) {
        *self.lock() = outcome;
        self.settled.notify_all();
    }

    /// Run the classifier on one feature vector. May block.
    ///
    /// # Errors
    /// Returns `InferenceError::NotReady` unless the model is `Ready`, and
    /// `InferenceError::Computation` if the model output is unusable.
    pub fn infer(&self, features: &FeatureVector) -> Result<ClassProbabilities, InferenceError> {
        let model = match &*self.lock() {
            Slot::Ready(model) => Arc::clone(model),
            other => return Err(InferenceError::NotReady(other.state().to_string())),
        };

        let probabilities = model.predict(features)?;
        if !probabilities.is_finite() {
            return Err(InferenceError::Computation(format!(
                "Non-finite class probabilities: {probabilities:?}"
            )));
        }
        Ok(probabilities)
    }

    /// Drop the loaded model and return to `Unloaded`.
    ///
    /// Waits for an in-flight load to settle first. Returns `true` if a
    /// model was actually released; repeated calls are no-ops.
    pub fn release(&self) -> bool {
        let mut slot = self.lock();
        while matches!(*slot, Slot::Loading) {
            slot = self
                .settled
                .wait(slot)
                .unwrap_or_else(PoisonError::into_inner);
        }

        let released = matches!(*slot, Slot::Ready(_));
        *slot = Slot::Unloaded;
        if released {
            tracing::info!("Risk model released");
        }
        released
    }
}
