//! Storage port: Trait for persisting finished health reports.

use crate::domain::HealthReport;

/// A page of reports with pagination metadata.
#[derive(Debug, Clone)]
pub struct ReportPage {
    pub items: Vec<HealthReport>,
    /// Total count of stored reports
    pub total_count: usize,
    pub offset: usize,
    pub limit: usize,
    pub has_more: bool,
}

impl ReportPage {
    #[must_use]
    pub fn new(items: Vec<HealthReport>, total_count: usize, offset: usize, limit: usize) -> Self {
        let has_more = offset + items.len() < total_count;
        Self {
            items,
            total_count,
            offset,
            limit,
            has_more,
        }
    }

    #[must_use]
    pub fn next_offset(&self) -> Option<usize> {
        self.has_more.then_some(self.offset + self.limit)
    }
}

/// Local persistence for health reports.
pub trait ReportStore: Send + Sync {
    /// Error type for storage operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Save a report.
    ///
    /// # Errors
    /// Returns error if the report cannot be written.
    fn save_report(&self, report: &HealthReport) -> Result<(), Self::Error>;

    /// Load a report by ID.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn load_report(&self, id: &str) -> Result<Option<HealthReport>, Self::Error>;

    /// Load the most recent reports, newest first.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn load_recent_reports(&self, limit: usize) -> Result<Vec<HealthReport>, Self::Error>;

    /// Load reports with offset pagination, newest first.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn load_reports_paginated(&self, offset: usize, limit: usize)
        -> Result<ReportPage, Self::Error>;

    /// # Errors
    /// Returns error if storage operation fails.
    fn count_reports(&self) -> Result<usize, Self::Error>;

    /// # Errors
    /// Returns error if storage operation fails.
    fn delete_report(&self, id: &str) -> Result<(), Self::Error>;

    /// Remove every stored report.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn clear_all(&self) -> Result<(), Self::Error>;
}
