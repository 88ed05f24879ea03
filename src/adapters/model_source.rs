//! Model sources: where the classifier artifact bytes come from.
//!
//! - `BundledModelSource`: the artifact compiled into the binary
//! - `FileModelSource`: an artifact on disk, optionally pinned by SHA-256

use std::path::PathBuf;

use sha2::{Digest, Sha256};

use crate::ports::{ModelLoadError, ModelSource};

/// Classifier artifact shipped with the application.
pub const BUNDLED_MODEL: &[u8] = include_bytes!("../../models/maternal_risk.json");

/// Lowercase hex SHA-256 of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Serves a fixed in-memory buffer (the bundled artifact by default).
#[derive(Debug, Clone)]
pub struct BundledModelSource {
    name: &'static str,
    bytes: &'static [u8],
}

impl BundledModelSource {
    #[must_use]
    pub fn new() -> Self {
        Self::from_static("bundled:maternal_risk.json", BUNDLED_MODEL)
    }

    #[must_use]
    pub fn from_static(name: &'static str, bytes: &'static [u8]) -> Self {
        Self { name, bytes }
    }
}

impl Default for BundledModelSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelSource for BundledModelSource {
    fn describe(&self) -> String {
        self.name.to_string()
    }

    fn fetch(&self) -> Result<Vec<u8>, ModelLoadError> {
        if self.bytes.is_empty() {
            return Err(ModelLoadError::NotFound(self.name.to_string()));
        }
        Ok(self.bytes.to_vec())
    }
}

/// Reads the artifact from disk on every fetch.
#[derive(Debug, Clone)]
pub struct FileModelSource {
    path: PathBuf,
    expected_sha256: Option<String>,
}

impl FileModelSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            expected_sha256: None,
        }
    }

    /// Refuse artifacts whose SHA-256 differs from `digest_hex`.
    #[must_use]
    pub fn with_expected_sha256(mut self, digest_hex: impl Into<String>) -> Self {
        self.expected_sha256 = Some(digest_hex.into().trim().to_ascii_lowercase());
        self
    }
}

impl ModelSource for FileModelSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self) -> Result<Vec<u8>, ModelLoadError> {
        if !self.path.is_file() {
            return Err(ModelLoadError::NotFound(self.describe()));
        }

        let bytes = std::fs::read(&self.path)
            .map_err(|e| ModelLoadError::Read(format!("{}: {e}", self.describe())))?;

        if let Some(expected) = &self.expected_sha256 {
            let actual = sha256_hex(&bytes);
            if &actual != expected {
                tracing::error!("Model artifact at {:?} failed digest check", self.path);
                return Err(ModelLoadError::DigestMismatch {
                    expected: expected.clone(),
                    actual,
                });
            }
        } else {
            tracing::warn!(
                "Loading model artifact {:?} without a pinned digest",
                self.path
            );
        }

        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, TempDir};

    fn temp_artifact(bytes: &[u8]) -> (TempDir, PathBuf) {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("model.json");
        std::fs::write(&path, bytes).expect("Should write artifact");
        (temp, path)
    }

    #[test]
    fn test_bundled_source() {
        let source = BundledModelSource::new();
        let bytes = source.fetch().expect("Should fetch");
        assert_eq!(bytes, BUNDLED_MODEL);
        assert!(source.describe().starts_with("bundled:"));
    }

    #[test]
    fn test_empty_bundle_is_not_found() {
        let source = BundledModelSource::from_static("bundled:empty", b"");
        assert!(matches!(source.fetch(), Err(ModelLoadError::NotFound(_))));
    }

    #[test]
    fn test_missing_file() {
        let source = FileModelSource::new("/nonexistent/materna/model.json");
        assert!(matches!(source.fetch(), Err(ModelLoadError::NotFound(_))));
    }

    #[test]
    fn test_unpinned_file_is_read() {
        let (_temp, path) = temp_artifact(BUNDLED_MODEL);
        let source = FileModelSource::new(&path);

        assert_eq!(source.fetch().expect("Should fetch"), BUNDLED_MODEL);
        assert!(source.describe().ends_with("model.json"));
    }

    #[test]
    fn test_pinned_digest_accepts_match() {
        let (_temp, path) = temp_artifact(b"{\"x\":1}");
        let digest = sha256_hex(b"{\"x\":1}");

        let source = FileModelSource::new(&path).with_expected_sha256(digest.to_uppercase());
        assert_eq!(source.fetch().expect("Should fetch"), b"{\"x\":1}");
    }

    #[test]
    fn test_pinned_digest_rejects_tampering() {
        let (_temp, path) = temp_artifact(b"tampered");
        let source = FileModelSource::new(&path).with_expected_sha256(sha256_hex(b"original"));

        let err = source.fetch().expect_err("Should reject");
        assert!(matches!(err, ModelLoadError::DigestMismatch { .. }));
    }

    #[test]
    fn test_sha256_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
