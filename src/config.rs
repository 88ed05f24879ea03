//! Environment-driven settings.
//!
//! Every knob is a `MATERNA_*` environment variable; unset variables fall
//! back to defaults that work from a source checkout.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use crate::adapters::model_source::{BundledModelSource, FileModelSource};
use crate::adapters::sanitize::DEFAULT_SANITIZE_MAX_BYTES;
use crate::ports::ModelSource;
use crate::MaternaError;

pub const DEFAULT_DB_PATH: &str = "materna.db";
pub const DEFAULT_LOG_FILE: &str = "materna.log";

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogMode {
    File,
    /// Standard error, keeping stdout free for command output
    Stderr,
    /// File when attached to a terminal, stderr otherwise
    #[default]
    Auto,
}

impl LogMode {
    #[must_use]
    pub fn use_file(self, interactive: bool) -> bool {
        match self {
            Self::File => true,
            Self::Stderr => false,
            Self::Auto => interactive,
        }
    }
}

impl FromStr for LogMode {
    type Err = MaternaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File),
            "stderr" => Ok(Self::Stderr),
            "auto" | "" => Ok(Self::Auto),
            other => Err(MaternaError::Config(format!(
                "MATERNA_LOG_MODE must be file, stderr or auto (got {other:?})"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub model_path: Option<PathBuf>,
    pub model_sha256: Option<String>,
    pub db_path: PathBuf,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
    pub sanitize_max_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model_path: None,
            model_sha256: None,
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            log_mode: LogMode::Auto,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            sanitize_max_bytes: DEFAULT_SANITIZE_MAX_BYTES,
        }
    }
}

impl Settings {
    /// Read settings from the process environment.
    ///
    /// # Errors
    /// Returns `MaternaError::Config` for malformed values.
    pub fn from_env() -> Result<Self, MaternaError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`; empty values count as unset.
    ///
    /// # Errors
    /// Returns `MaternaError::Config` for malformed values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, MaternaError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let model_sha256 = get("MATERNA_MODEL_SHA256")
            .map(|d| d.trim().to_ascii_lowercase())
            .map(|d| {
                if d.len() == 64 && d.chars().all(|c| c.is_ascii_hexdigit()) {
                    Ok(d)
                } else {
                    Err(MaternaError::Config(
                        "MATERNA_MODEL_SHA256 must be 64 hex characters".to_string(),
                    ))
                }
            })
            .transpose()?;

        let sanitize_max_bytes = match get("MATERNA_SANITIZE_MAX_BYTES") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(MaternaError::Config(format!(
                        "MATERNA_SANITIZE_MAX_BYTES must be a positive integer (got {raw:?})"
                    )))
                }
            },
            None => defaults.sanitize_max_bytes,
        };

        Ok(Self {
            model_path: get("MATERNA_MODEL_PATH").map(PathBuf::from),
            model_sha256,
            db_path: get("MATERNA_DB_PATH").map_or(defaults.db_path, PathBuf::from),
            log_mode: get("MATERNA_LOG_MODE")
                .map(|m| m.parse::<LogMode>())
                .transpose()?
                .unwrap_or_default(),
            log_file: get("MATERNA_LOG_FILE").map_or(defaults.log_file, PathBuf::from),
            sanitize_max_bytes,
        })
    }

    /// The artifact provider these settings select.
    #[must_use]
    pub fn model_source(&self) -> Arc<dyn ModelSource> {
        match &self.model_path {
            Some(path) => {
                let source = FileModelSource::new(path.clone());
                match &self.model_sha256 {
                    Some(digest) => Arc::new(source.with_expected_sha256(digest.clone())),
                    None => Arc::new(source),
                }
            }
            None => Arc::new(BundledModelSource::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_lookup(lookup(&[])).expect("Should parse");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.db_path, PathBuf::from("materna.db"));
        assert_eq!(settings.model_source().describe(), "bundled:maternal_risk.json");
    }

    #[test]
    fn test_overrides() {
        let digest = "BA7816BF8F01CFEA414140DE5DAE2223B00361A396177A9CB410FF61F20015AD";
        let settings = Settings::from_lookup(lookup(&[
            ("MATERNA_MODEL_PATH", "/opt/models/risk.json"),
            ("MATERNA_MODEL_SHA256", digest),
            ("MATERNA_DB_PATH", "/tmp/reports.db"),
            ("MATERNA_LOG_MODE", "Stderr"),
            ("MATERNA_SANITIZE_MAX_BYTES", "4096"),
        ]))
        .expect("Should parse");

        assert_eq!(settings.model_path, Some(PathBuf::from("/opt/models/risk.json")));
        assert_eq!(settings.model_sha256.as_deref(), Some(&*digest.to_ascii_lowercase()));
        assert_eq!(settings.log_mode, LogMode::Stderr);
        assert_eq!(settings.sanitize_max_bytes, 4096);
        assert!(settings.model_source().describe().contains("risk.json"));
    }

    #[test]
    fn test_empty_values_are_unset() {
        let settings =
            Settings::from_lookup(lookup(&[("MATERNA_MODEL_PATH", "  "), ("MATERNA_LOG_MODE", "")]))
                .expect("Should parse");
        assert_eq!(settings.model_path, None);
        assert_eq!(settings.log_mode, LogMode::Auto);
    }

    #[test]
    fn test_rejects_malformed_values() {
        for pairs in [
            [("MATERNA_LOG_MODE", "syslog")],
            [("MATERNA_MODEL_SHA256", "abc123")],
            [("MATERNA_SANITIZE_MAX_BYTES", "0")],
        ] {
            assert!(matches!(
                Settings::from_lookup(lookup(&pairs)),
                Err(MaternaError::Config(_))
            ));
        }
    }

    #[test]
    fn test_log_mode_auto_follows_terminal() {
        assert!(LogMode::Auto.use_file(true));
        assert!(!LogMode::Auto.use_file(false));
        assert!(LogMode::File.use_file(false));
        assert!(!LogMode::Stderr.use_file(true));
    }
}
