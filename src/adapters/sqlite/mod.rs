//! SQLite adapter: Implementation of `ReportStore`.
//!
//! Reports are stored as a JSON payload next to a few indexed columns used
//! for listing. The connection is guarded by a `Mutex`; a poisoned lock is
//! surfaced as `StorageError::LockPoisoned` rather than a panic.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::SecondsFormat;
use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::HealthReport;
use crate::ports::{ReportPage, ReportStore};

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// SQLite report store.
pub struct SqliteReportStore {
    conn: Mutex<Connection>,
}

impl SqliteReportStore {
    /// Open (or create) the database at `path`.
    ///
    /// # Errors
    /// Returns error if database cannot be opened or initialized.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        Self::with_connection(Connection::open(path)?)
    }

    /// Create an in-memory SQLite database (for testing).
    ///
    /// # Errors
    /// Returns error if database cannot be created.
    pub fn in_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }

    fn init_schema(&self) -> Result<(), StorageError> {
        self.conn()?.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS reports (
                id TEXT PRIMARY KEY,
                overall_label TEXT NOT NULL,
                confidence REAL,
                payload TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_reports_created
                ON reports(created_at DESC);
            ",
        )?;
        Ok(())
    }

    fn decode_rows(payloads: Vec<String>) -> Result<Vec<HealthReport>, StorageError> {
        payloads
            .iter()
            .map(|p| serde_json::from_str(p).map_err(StorageError::from))
            .collect()
    }

    fn query_payloads(
        conn: &Connection,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<String>, StorageError> {
        let mut stmt = conn.prepare(
            r"
            SELECT payload FROM reports
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?1 OFFSET ?2
            ",
        )?;
        let payloads = stmt
            .query_map(params![limit as i64, offset as i64], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(payloads)
    }
}

impl ReportStore for SqliteReportStore {
    type Error = StorageError;

    fn save_report(&self, report: &HealthReport) -> Result<(), Self::Error> {
        let payload = serde_json::to_string(report)?;
        let confidence = report.prediction.map(|p| p.confidence);

        self.conn()?.execute(
            r"
            INSERT OR REPLACE INTO reports (id, overall_label, confidence, payload, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
            params![
                report.id,
                report.overall.label(),
                confidence,
                payload,
                report
                    .created_at
                    .to_rfc3339_opts(SecondsFormat::Nanos, true),
            ],
        )?;

        tracing::debug!("Saved report {} to storage", report.id);
        Ok(())
    }

    fn load_report(&self, id: &str) -> Result<Option<HealthReport>, Self::Error> {
        let payload: Option<String> = self
            .conn()?
            .query_row(
                "SELECT payload FROM reports WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;

        payload
            .map(|p| serde_json::from_str(&p).map_err(StorageError::from))
            .transpose()
    }

    fn load_recent_reports(&self, limit: usize) -> Result<Vec<HealthReport>, Self::Error> {
        let payloads = {
            let conn = self.conn()?;
            Self::query_payloads(&conn, limit, 0)?
        };
        Self::decode_rows(payloads)
    }

    fn load_reports_paginated(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<ReportPage, Self::Error> {
        let (total, payloads) = {
            let conn = self.conn()?;
            let total: i64 = conn.query_row("SELECT COUNT(*) FROM reports", [], |row| row.get(0))?;
            (total, Self::query_payloads(&conn, limit, offset)?)
        };

        Ok(ReportPage::new(
            Self::decode_rows(payloads)?,
            total as usize,
            offset,
            limit,
        ))
    }

    fn count_reports(&self) -> Result<usize, Self::Error> {
        let count: i64 = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM reports", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn delete_report(&self, id: &str) -> Result<(), Self::Error> {
        self.conn()?
            .execute("DELETE FROM reports WHERE id = ?1", params![id])?;
        Ok(())
    }

    fn clear_all(&self) -> Result<(), Self::Error> {
        self.conn()?.execute("DELETE FROM reports", [])?;
        tracing::warn!("Cleared all reports from storage");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::report::build_at;
    use crate::domain::{interpret, ObstetricHistory, PersonalVitals};
    use chrono::{Duration, Local, TimeZone};

    fn vitals() -> PersonalVitals {
        PersonalVitals {
            age: 31,
            systolic_bp: 118,
            diastolic_bp: 76,
            glucose: 102.0,
            body_temperature: 98.4,
            pulse_rate: 80,
            hemoglobin: 12.2,
            hba1c: 5.4,
            respiration_rate: 18,
        }
    }

    fn report_at(minutes: i64, with_prediction: bool) -> HealthReport {
        let base = Local
            .with_ymd_and_hms(2026, 5, 1, 9, 0, 0)
            .single()
            .expect("Valid local time");
        let prediction = with_prediction.then(|| interpret((0.3, 0.7).into()));
        build_at(
            &vitals(),
            &ObstetricHistory {
                gravida: 1,
                ..Default::default()
            },
            "Test Patient",
            prediction,
            base + Duration::minutes(minutes),
        )
    }

    #[test]
    fn test_report_crud() {
        let store = SqliteReportStore::in_memory().expect("Should create db");
        assert_eq!(store.count_reports().expect("Should count"), 0);

        let report = report_at(0, true);
        store.save_report(&report).expect("Should save");
        assert_eq!(store.count_reports().expect("Should count"), 1);

        let loaded = store
            .load_report(&report.id)
            .expect("Should load")
            .expect("Should exist");
        assert_eq!(loaded.id, report.id);
        assert_eq!(loaded.overall, report.overall);
        assert_eq!(loaded.metrics.len(), report.metrics.len());

        store.delete_report(&report.id).expect("Should delete");
        assert_eq!(store.count_reports().expect("Should count"), 0);
        assert!(store.load_report(&report.id).expect("Should load").is_none());
    }

    #[test]
    fn test_recent_reports_newest_first() {
        let store = SqliteReportStore::in_memory().expect("Should create db");
        let older = report_at(0, true);
        let newer = report_at(30, false);

        store.save_report(&older).expect("Should save");
        store.save_report(&newer).expect("Should save");

        let recent = store.load_recent_reports(10).expect("Should load");
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].id, newer.id);
        assert_eq!(recent[1].id, older.id);

        let limited = store.load_recent_reports(1).expect("Should load");
        assert_eq!(limited.len(), 1);
    }

    #[test]
    fn test_pagination() {
        let store = SqliteReportStore::in_memory().expect("Should create db");
        for i in 0..5 {
            store.save_report(&report_at(i, i % 2 == 0)).expect("Should save");
        }

        let first = store.load_reports_paginated(0, 2).expect("Should page");
        assert_eq!(first.items.len(), 2);
        assert_eq!(first.total_count, 5);
        assert!(first.has_more);
        assert_eq!(first.next_offset(), Some(2));

        let last = store.load_reports_paginated(4, 2).expect("Should page");
        assert_eq!(last.items.len(), 1);
        assert!(!last.has_more);
        assert_eq!(last.next_offset(), None);
    }

    #[test]
    fn test_unavailable_report_persists_label() {
        let store = SqliteReportStore::in_memory().expect("Should create db");
        let report = report_at(0, false);
        store.save_report(&report).expect("Should save");

        let label: String = store
            .conn()
            .expect("Should lock")
            .query_row(
                "SELECT overall_label FROM reports WHERE id = ?1",
                params![report.id],
                |row| row.get(0),
            )
            .expect("Should query");
        assert_eq!(label, "AI Unavailable");
    }

    #[test]
    fn test_clear_all() {
        let store = SqliteReportStore::in_memory().expect("Should create db");
        store.save_report(&report_at(0, true)).expect("Should save");
        store.save_report(&report_at(1, true)).expect("Should save");

        store.clear_all().expect("Should clear");
        assert_eq!(store.count_reports().expect("Should count"), 0);
    }
}
