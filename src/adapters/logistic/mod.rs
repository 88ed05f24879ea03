//! Logistic adapter: `RiskModel` backed by an exported logistic regression.
//!
//! The training pipeline exports a standardized binary logistic regression
//! as JSON:
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "model_type": "logistic_regression",
//!   "feature_names": ["age", "gravida", ...],
//!   "scaler_mean": [...],
//!   "scaler_scale": [...],
//!   "coefficients": [...],
//!   "intercept": -2.35
//! }
//! ```
//!
//! Evaluation standardizes each input, takes the weighted sum and maps it
//! through a sigmoid to `P(high risk)`; `P(no risk)` is its complement.

use serde::{Deserialize, Serialize};

use crate::domain::{ClassProbabilities, FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
use crate::ports::{InferenceError, ModelLoadError, RiskModel};

/// Artifact format versions this adapter understands.
const SUPPORTED_FORMAT_VERSION: u32 = 1;

const MODEL_TYPE: &str = "logistic_regression";

/// Model parameters as exported by the training pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedLogisticModel {
    pub format_version: u32,
    pub model_type: String,
    pub feature_names: Vec<String>,
    pub scaler_mean: Vec<f64>,
    pub scaler_scale: Vec<f64>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

/// Decoded logistic regression ready for inference.
#[derive(Debug, Clone)]
pub struct LogisticModel {
    mean: [f64; FEATURE_COUNT],
    scale: [f64; FEATURE_COUNT],
    coefficients: [f64; FEATURE_COUNT],
    intercept: f64,
}

impl LogisticModel {
    /// Validate exported parameters against the feature contract.
    ///
    /// # Errors
    /// Returns `ModelLoadError` if the export is unusable.
    pub fn from_export(export: ExportedLogisticModel) -> Result<Self, ModelLoadError> {
        if export.format_version != SUPPORTED_FORMAT_VERSION {
            return Err(ModelLoadError::Corrupt(format!(
                "Unsupported format version: {}",
                export.format_version
            )));
        }
        if export.model_type != MODEL_TYPE {
            return Err(ModelLoadError::Corrupt(format!(
                "Unsupported model type: {}",
                export.model_type
            )));
        }

        let names: Vec<&str> = export.feature_names.iter().map(String::as_str).collect();
        if names != FEATURE_NAMES {
            return Err(ModelLoadError::FeatureMismatch(format!(
                "expected {FEATURE_NAMES:?}, artifact declares {names:?}"
            )));
        }

        let mean = fixed_len("scaler_mean", &export.scaler_mean)?;
        let scale = fixed_len("scaler_scale", &export.scaler_scale)?;
        let coefficients = fixed_len("coefficients", &export.coefficients)?;

        if scale.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(ModelLoadError::Corrupt(
                "scaler_scale entries must be finite and positive".into(),
            ));
        }
        if mean
            .iter()
            .chain(coefficients.iter())
            .chain(std::iter::once(&export.intercept))
            .any(|v| !v.is_finite())
        {
            return Err(ModelLoadError::Corrupt(
                "Model parameters must be finite".into(),
            ));
        }

        Ok(Self {
            mean,
            scale,
            coefficients,
            intercept: export.intercept,
        })
    }

    /// Raw decision value (log-odds of high risk).
    #[must_use]
    pub fn decision_function(&self, features: &FeatureVector) -> f64 {
        features
            .as_slice()
            .iter()
            .enumerate()
            .fold(self.intercept, |acc, (i, x)| {
                acc + self.coefficients[i] * (x - self.mean[i]) / self.scale[i]
            })
    }
}

fn fixed_len(field: &str, values: &[f64]) -> Result<[f64; FEATURE_COUNT], ModelLoadError> {
    values.try_into().map_err(|_| {
        ModelLoadError::Corrupt(format!(
            "{field} has {} entries, expected {FEATURE_COUNT}",
            values.len()
        ))
    })
}

/// Sigmoid that stays finite for large magnitudes.
fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

impl RiskModel for LogisticModel {
    fn decode(bytes: &[u8]) -> Result<Self, ModelLoadError> {
        let export: ExportedLogisticModel = serde_json::from_slice(bytes)
            .map_err(|e| ModelLoadError::Corrupt(e.to_string()))?;
        let model = Self::from_export(export)?;
        tracing::debug!("Decoded logistic model (intercept={:.3})", model.intercept);
        Ok(model)
    }

    fn predict(&self, features: &FeatureVector) -> Result<ClassProbabilities, InferenceError> {
        let z = self.decision_function(features);
        if !z.is_finite() {
            return Err(InferenceError::Computation(format!(
                "Non-finite decision value: {z}"
            )));
        }

        let high_risk = sigmoid(z);
        Ok(ClassProbabilities::new(1.0 - high_risk, high_risk))
    }
}
