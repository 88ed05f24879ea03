//! Digest utility for Materna model artifacts.
//!
//! Checks that an artifact decodes as a risk model and prints the SHA-256
//! to pin it with `MATERNA_MODEL_SHA256`.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin model_digest -- <artifact.json>
//! ```

use std::env;
use std::fs;
use std::path::PathBuf;

use materna::adapters::logistic::LogisticModel;
use materna::adapters::model_source::sha256_hex;
use materna::ports::RiskModel;

fn parse_args() -> Result<PathBuf, String> {
    let mut args = env::args().skip(1);
    let path = args
        .next()
        .ok_or_else(|| "Usage: model_digest <artifact.json>".to_string())?;
    if let Some(extra) = args.next() {
        return Err(format!("Unexpected argument: {extra}"));
    }
    Ok(PathBuf::from(path))
}

fn main() -> Result<(), String> {
    let path = parse_args()?;
    let bytes = fs::read(&path).map_err(|e| format!("Failed to read {path:?}: {e}"))?;

    LogisticModel::decode(&bytes).map_err(|e| format!("{path:?} is not a usable model: {e}"))?;

    println!("{}  {}", sha256_hex(&bytes), path.display());
    Ok(())
}
