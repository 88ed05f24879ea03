//! Background assessment worker.
//!
//! Model inference can block, so interactive callers hand the request to a
//! worker thread and poll for progress instead of running it inline.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::adapters::StorageError;
use crate::domain::HealthReport;
use crate::ports::{ReportStore, RiskModel};
use crate::MaternaError;

use super::assessment::{AssessmentRequest, AssessmentService};

/// Progress updates from the assessment worker.
#[derive(Debug, Clone)]
pub enum AssessmentProgress {
    /// Checking the request
    Validating,
    /// Running the classifier
    Predicting,
    /// Finished with a report
    Complete(Box<HealthReport>),
    /// The assessment could not be completed
    Error(String),
}

/// Handle to a running assessment.
pub struct AssessmentWorkerHandle {
    progress_rx: Receiver<AssessmentProgress>,
    handle: Option<JoinHandle<()>>,
}

impl AssessmentWorkerHandle {
    /// Try to receive the next progress update (non-blocking).
    #[must_use]
    pub fn try_recv(&self) -> Option<AssessmentProgress> {
        self.progress_rx.try_recv().ok()
    }

    /// Block until the worker finishes, passing each update to `on_progress`.
    ///
    /// # Errors
    /// Returns `MaternaError::Worker` if the assessment failed or the worker
    /// thread died before reporting.
    pub fn wait(
        mut self,
        mut on_progress: impl FnMut(&AssessmentProgress),
    ) -> Result<HealthReport, MaternaError> {
        let mut outcome = Err(MaternaError::Worker(
            "Worker exited without a result".to_string(),
        ));

        for update in self.progress_rx.iter() {
            on_progress(&update);
            match update {
                AssessmentProgress::Complete(report) => {
                    outcome = Ok(*report);
                    break;
                }
                AssessmentProgress::Error(message) => {
                    outcome = Err(MaternaError::Worker(message));
                    break;
                }
                _ => {}
            }
        }

        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("Assessment worker panicked");
            }
        }
        outcome
    }
}

/// Runs assessments on a background thread.
pub struct AssessmentWorker;

impl AssessmentWorker {
    /// Spawn a background assessment.
    ///
    /// Returns a handle to receive progress updates.
    pub fn spawn<M, S>(
        service: Arc<AssessmentService<M, S>>,
        request: AssessmentRequest,
    ) -> AssessmentWorkerHandle
    where
        M: RiskModel + 'static,
        S: ReportStore + 'static,
        S::Error: Into<StorageError>,
    {
        let (tx, rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            Self::run_with_progress(&service, &request, &tx);
        });

        AssessmentWorkerHandle {
            progress_rx: rx,
            handle: Some(handle),
        }
    }

    fn run_with_progress<M, S>(
        service: &AssessmentService<M, S>,
        request: &AssessmentRequest,
        tx: &Sender<AssessmentProgress>,
    ) where
        M: RiskModel,
        S: ReportStore,
        S::Error: Into<StorageError>,
    {
        // Send errors only mean the receiver is gone; the work still finishes.
        let _ = tx.send(AssessmentProgress::Validating);
        if let Err(e) = request.validate() {
            let _ = tx.send(AssessmentProgress::Error(MaternaError::from(e).to_string()));
            return;
        }

        let _ = tx.send(AssessmentProgress::Predicting);
        let report = service.assess_validated(request);
        let _ = tx.send(AssessmentProgress::Complete(Box::new(report)));
    }
}
