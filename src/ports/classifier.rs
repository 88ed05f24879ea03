//! Classifier ports: where model bytes come from and how a model runs.
//!
//! The trained classifier is opaque to the application. These traits only
//! fix the calling convention: bytes in, a decoded model out, and two class
//! probabilities per feature vector.

use crate::domain::{ClassProbabilities, FeatureVector};

/// Errors raised while bringing a model into memory.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelLoadError {
    #[error("Model artifact not found: {0}")]
    NotFound(String),

    #[error("Failed to read model artifact: {0}")]
    Read(String),

    #[error("Model artifact digest mismatch: expected {expected}, got {actual}")]
    DigestMismatch { expected: String, actual: String },

    #[error("Corrupt model artifact: {0}")]
    Corrupt(String),

    #[error("Model feature contract mismatch: {0}")]
    FeatureMismatch(String),
}

/// Errors raised by a single inference call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InferenceError {
    #[error("Model not ready (state: {0})")]
    NotReady(String),

    #[error("Inference computation failed: {0}")]
    Computation(String),
}

/// Provider of the raw model artifact.
///
/// Implementations may read a bundled buffer, a file, or anything else that
/// yields bytes. A fetch may block.
pub trait ModelSource: Send + Sync {
    /// Human-readable origin of the artifact, for logs.
    fn describe(&self) -> String;

    /// Produce the artifact bytes.
    ///
    /// # Errors
    /// Returns `ModelLoadError` if the artifact is missing or unreadable.
    fn fetch(&self) -> Result<Vec<u8>, ModelLoadError>;
}

/// A decoded binary risk classifier.
///
/// Models are read-only after decoding so one instance can serve
/// concurrent inference calls.
pub trait RiskModel: Send + Sync + Sized {
    /// Decode a model from its artifact bytes.
    ///
    /// # Errors
    /// Returns `ModelLoadError::Corrupt` or `ModelLoadError::FeatureMismatch`
    /// if the bytes do not describe a usable model.
    fn decode(bytes: &[u8]) -> Result<Self, ModelLoadError>;

    /// Run the model on one input.
    ///
    /// # Errors
    /// Returns `InferenceError::Computation` on numeric failure.
    fn predict(&self, features: &FeatureVector) -> Result<ClassProbabilities, InferenceError>;
}
