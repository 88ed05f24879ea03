//! Ports layer: Trait definitions for external operations.
//!
//! These traits mark the boundaries between the assessment pipeline and
//! the things it does not own: the model artifact, the trained model and
//! report persistence.

mod classifier;
mod storage;

pub use classifier::{InferenceError, ModelLoadError, ModelSource, RiskModel};
pub use storage::{ReportPage, ReportStore};
