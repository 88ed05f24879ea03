//! Adapters layer: Concrete implementations of ports.
//!
//! - `logistic`: exported logistic-regression classifier
//! - `model_source`: bundled and file-backed model artifacts
//! - `sqlite`: SQLite report storage
//! - `sanitize`: PII filtering for logs

pub mod logistic;
pub mod model_source;
pub mod sanitize;
pub mod sqlite;

pub use sqlite::StorageError;
