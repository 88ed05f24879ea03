//! # Materna
//!
//! Maternal health risk assessment pipeline.
//!
//! This crate provides:
//! - Feature assembly from personal vitals and obstetric history
//! - A managed binary risk classifier with explicit load and release
//! - Health reports with banded metrics and an overall status
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core business types (vitals, features, predictions, reports)
//! - `ports`: Trait definitions for model sources, models and storage
//! - `adapters`: Concrete implementations (logistic model, SQLite, log sanitizing)
//! - `application`: Use cases orchestrating domain and ports
//! - `config`: Environment-driven settings

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use domain::{HealthReport, ObstetricHistory, PersonalVitals, RiskLevel, RiskPrediction};

/// Result type for Materna operations
pub type Result<T> = std::result::Result<T, MaternaError>;

/// Main error type for Materna
#[derive(Debug, thiserror::Error)]
pub enum MaternaError {
    #[error("Invalid assessment input: {0}")]
    Validation(#[from] domain::ValidationError),

    #[error("Model load failed: {0}")]
    ModelLoad(#[from] ports::ModelLoadError),

    #[error("Inference failed: {0}")]
    Inference(#[from] ports::InferenceError),

    #[error("Storage operation failed: {0}")]
    Storage(#[from] adapters::StorageError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Assessment worker failed: {0}")]
    Worker(String),
}
