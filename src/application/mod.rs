//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with ports to implement
//! the core use cases of the application.

mod assessment;
mod classifier;
mod worker;

pub use assessment::{AssessmentRequest, AssessmentService};
pub use classifier::{ClassifierAdapter, ModelState};
pub use worker::{AssessmentProgress, AssessmentWorker, AssessmentWorkerHandle};
