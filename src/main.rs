//! Materna: Maternal health risk assessment
//!
//! Main entry point for the command-line application.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use materna::adapters::logistic::LogisticModel;
use materna::adapters::sanitize::SanitizingMakeWriter;
use materna::adapters::sqlite::SqliteReportStore;
use materna::application::{
    AssessmentProgress, AssessmentRequest, AssessmentService, AssessmentWorker, ClassifierAdapter,
};
use materna::config::Settings;

const DEFAULT_HISTORY_LIMIT: usize = 10;

const USAGE: &str = "Usage:
  materna assess <request.json>
  materna history [limit]";

enum Command {
    Assess(PathBuf),
    History(usize),
}

fn parse_args() -> Result<Command> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [cmd, path] if cmd == "assess" => Ok(Command::Assess(PathBuf::from(path))),
        [cmd] if cmd == "history" => Ok(Command::History(DEFAULT_HISTORY_LIMIT)),
        [cmd, limit] if cmd == "history" => {
            let limit = limit
                .parse()
                .with_context(|| format!("Invalid history limit: {limit}"))?;
            Ok(Command::History(limit))
        }
        _ => bail!("{USAGE}"),
    }
}

fn main() -> Result<()> {
    let command = parse_args()?;
    let settings = Settings::from_env()?;

    // Initialize logging.
    //
    // Stdout carries command output (report JSON), so logs never go there.
    // Default behavior:
    // - interactive TTY: log to a file
    // - non-interactive: log to stderr
    let interactive = std::io::stderr().is_terminal();
    let (writer, _guard) = if settings.log_mode.use_file(interactive) {
        if let Some(parent) = settings.log_file.parent() {
            // Best-effort: the open below reports the real failure.
            let _ = std::fs::create_dir_all(parent);
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&settings.log_file)
            .with_context(|| format!("Failed to open log file {:?}", settings.log_file))?;
        tracing_appender::non_blocking(file)
    } else {
        tracing_appender::non_blocking(std::io::stderr())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(SanitizingMakeWriter::new(writer, settings.sanitize_max_bytes)),
        )
        .init();

    tracing::info!("Starting Materna...");

    let storage = Arc::new(
        SqliteReportStore::new(&settings.db_path)
            .with_context(|| format!("Failed to open report database {:?}", settings.db_path))?,
    );

    match command {
        Command::Assess(path) => assess(&settings, storage, &path)?,
        Command::History(limit) => history(storage, limit)?,
    }

    tracing::info!("Materna shutdown complete.");
    Ok(())
}

fn assess(settings: &Settings, storage: Arc<SqliteReportStore>, path: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read request {path:?}"))?;
    let request: AssessmentRequest =
        serde_json::from_str(&raw).with_context(|| format!("Malformed request {path:?}"))?;

    let classifier = Arc::new(ClassifierAdapter::<LogisticModel>::new(
        settings.model_source(),
    ));
    if let Err(e) = classifier.load() {
        // Reports fall back to the traditional assessment.
        tracing::warn!("Risk model unavailable: {e}");
    }

    let service = Arc::new(AssessmentService::new(Arc::clone(&classifier), storage));
    let outcome = AssessmentWorker::spawn(service, request).wait(|progress| match progress {
        AssessmentProgress::Validating => tracing::debug!("Validating request"),
        AssessmentProgress::Predicting => tracing::debug!("Running risk assessment"),
        AssessmentProgress::Complete(_) | AssessmentProgress::Error(_) => {}
    });

    classifier.release();
    let report = outcome?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn history(storage: Arc<SqliteReportStore>, limit: usize) -> Result<()> {
    use materna::ports::ReportStore;

    let reports = storage.load_recent_reports(limit)?;
    if reports.is_empty() {
        println!("No reports yet.");
        return Ok(());
    }

    for report in &reports {
        let confidence = report
            .prediction
            .map(|p| format!("{:.1}%", p.confidence * 100.0))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}  {:<20}  {:<14}  {:>6}  {}",
            report.id,
            report.date,
            report.overall.label(),
            confidence,
            report.patient_name
        );
    }
    println!("{} of {} reports", reports.len(), storage.count_reports()?);
    Ok(())
}
