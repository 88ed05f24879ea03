//! Domain layer: Core maternal-health types and pure logic.
//!
//! Nothing here performs I/O. Feature assembly, risk interpretation and
//! report building are plain functions over the records defined below.

mod features;
mod patient;
mod prediction;
pub mod report;

pub use features::{assemble, FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
pub use patient::{ObstetricHistory, PersonalVitals, ValidationError};
pub use prediction::{interpret, ClassProbabilities, RiskLevel, RiskPrediction};
pub use report::{HealthReport, MetricEntry, MetricStatus, NormalRange, OverallStatus};
