//! Assessment service: Orchestrates one risk assessment end to end.
//!
//! This service coordinates:
//! - Input validation
//! - Feature assembly
//! - Classifier inference
//! - Risk interpretation
//! - Report building and persistence

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::adapters::StorageError;
use crate::domain::{
    assemble, interpret, report, HealthReport, ObstetricHistory, PersonalVitals, RiskPrediction,
    ValidationError,
};
use crate::ports::{ReportStore, RiskModel};
use crate::MaternaError;

use super::classifier::ClassifierAdapter;

/// Everything needed to run one assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRequest {
    pub patient_name: String,
    pub vitals: PersonalVitals,
    pub history: ObstetricHistory,
}

impl AssessmentRequest {
    /// # Errors
    /// Returns every problem found in either record.
    pub fn validate(&self) -> Result<(), ValidationError> {
        ValidationError::merge([self.vitals.validate(), self.history.validate()])
    }
}

/// Service for running risk assessments.
///
/// The service never loads the model itself: whoever owns the classifier
/// decides when to call `load()`. Until then every report carries the
/// "AI Unavailable" status.
pub struct AssessmentService<M, S>
where
    M: RiskModel,
    S: ReportStore,
{
    classifier: Arc<ClassifierAdapter<M>>,
    storage: Arc<S>,
}

impl<M, S> AssessmentService<M, S>
where
    M: RiskModel,
    S: ReportStore,
    S::Error: Into<StorageError>,
{
    pub fn new(classifier: Arc<ClassifierAdapter<M>>, storage: Arc<S>) -> Self {
        Self {
            classifier,
            storage,
        }
    }

    #[must_use]
    pub fn classifier(&self) -> &Arc<ClassifierAdapter<M>> {
        &self.classifier
    }

    /// Assemble, infer and interpret.
    ///
    /// Inference failures are logged and yield `None`; no label is ever
    /// produced without a successful inference.
    #[must_use]
    pub fn predict(
        &self,
        vitals: &PersonalVitals,
        history: &ObstetricHistory,
    ) -> Option<RiskPrediction> {
        let features = assemble(vitals, history);
        tracing::debug!("Assembled {} features", features.as_slice().len());

        match self.classifier.infer(&features) {
            Ok(probabilities) => Some(interpret(probabilities)),
            Err(e) => {
                tracing::warn!("Risk prediction unavailable: {e}");
                None
            }
        }
    }

    /// Run a full assessment and persist the resulting report.
    ///
    /// A failed save is logged but does not fail the assessment.
    ///
    /// # Errors
    /// Returns `MaternaError::Validation` if the request is inconsistent.
    pub fn assess(&self, request: &AssessmentRequest) -> Result<HealthReport, MaternaError> {
        request.validate()?;
        Ok(self.assess_validated(request))
    }

    /// Run an assessment on a request the caller has already validated.
    pub(crate) fn assess_validated(&self, request: &AssessmentRequest) -> HealthReport {
        tracing::info!("Starting risk assessment...");
        let prediction = self.predict(&request.vitals, &request.history);
        let report = report::build(
            &request.vitals,
            &request.history,
            &request.patient_name,
            prediction,
        );

        if let Err(e) = self.storage.save_report(&report) {
            let e: StorageError = e.into();
            tracing::warn!("Failed to save report: {e}");
        }

        match &report.prediction {
            Some(p) => tracing::info!(
                "Assessment complete: risk={}, confidence={:.2}%",
                p.risk_level,
                p.confidence * 100.0
            ),
            None => tracing::info!(
                "Assessment complete without prediction: traditional status={}",
                report.traditional_status()
            ),
        }

        report
    }

    /// # Errors
    /// Returns error if storage operation fails.
    pub fn recent_reports(&self, limit: usize) -> Result<Vec<HealthReport>, MaternaError> {
        self.storage
            .load_recent_reports(limit)
            .map_err(|e| MaternaError::Storage(e.into()))
    }

    /// # Errors
    /// Returns error if storage operation fails.
    pub fn report_count(&self) -> Result<usize, MaternaError> {
        self.storage
            .count_reports()
            .map_err(|e| MaternaError::Storage(e.into()))
    }
}
