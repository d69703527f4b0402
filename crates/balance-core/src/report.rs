//! Batch import reporting
//!
//! Row-scoped problems accumulate here instead of aborting the batch.
//! The report is the single user-visible outcome of an import: counts
//! plus sampled messages, serializable for tooling.

use crate::schema::TableKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A row-scoped issue: 1-based file line number plus message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowIssue {
    pub line: usize,
    pub message: String,
}

/// Outcome of one import batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    pub table: TableKind,
    pub source: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub rows_seen: usize,
    pub rows_committed: usize,
    pub rows_failed: usize,
    pub records_created: usize,
    pub records_updated: usize,
    /// Failed rows, one entry per skipped row
    pub errors: Vec<RowIssue>,
    /// Non-fatal issues on rows that still committed
    pub warnings: Vec<RowIssue>,
}

impl ImportReport {
    pub fn new(table: TableKind, source: impl Into<String>) -> Self {
        Self {
            table,
            source: source.into(),
            started_at: Utc::now(),
            finished_at: None,
            rows_seen: 0,
            rows_committed: 0,
            rows_failed: 0,
            records_created: 0,
            records_updated: 0,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Record a failed row. The row is skipped and counted.
    pub fn error(&mut self, line: usize, message: impl Into<String>) {
        self.rows_failed += 1;
        self.errors.push(RowIssue {
            line,
            message: message.into(),
        });
    }

    /// Record a non-fatal issue on a row that still commits
    pub fn warn(&mut self, line: usize, message: impl Into<String>) {
        self.warnings.push(RowIssue {
            line,
            message: message.into(),
        });
    }

    /// Record a committed row and whether it created a new record
    pub fn committed(&mut self, created: bool) {
        self.rows_committed += 1;
        if created {
            self.records_created += 1;
        } else {
            self.records_updated += 1;
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Up to `n` sample error messages
    pub fn sample_errors(&self, n: usize) -> &[RowIssue] {
        &self.errors[..n.min(self.errors.len())]
    }

    /// One-line human summary
    pub fn summary(&self) -> String {
        format!(
            "{}: {} rows, {} committed ({} created, {} updated), {} failed, {} warnings",
            self.table,
            self.rows_seen,
            self.rows_committed,
            self.records_created,
            self.records_updated,
            self.rows_failed,
            self.warnings.len()
        )
    }
}
