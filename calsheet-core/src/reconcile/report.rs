use serde::Serialize;

use crate::error::SyncError;
use crate::normalize::RowIssue;

/// What a pull pass did to the table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PullReport {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub unchanged: usize,
    /// The table had no usable header and the reference one was written.
    pub header_initialized: bool,
}

impl PullReport {
    pub fn has_changes(&self) -> bool {
        self.created + self.updated + self.deleted > 0 || self.header_initialized
    }
}

/// A table row a push pass left alone because it failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    /// Sheet row number, the header being row 1.
    pub row: usize,
    pub title: String,
    pub issue: RowIssue,
}

impl SkippedRow {
    pub fn to_error(&self) -> SyncError {
        SyncError::RowValidation {
            row: self.row,
            title: self.title.clone(),
            issue: self.issue,
        }
    }
}

/// What a push pass did to the calendar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PushReport {
    pub added: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub deleted: usize,
    /// Deletion candidates kept because the user said no.
    pub declined: usize,
    pub skipped: Vec<SkippedRow>,
}

impl PushReport {
    pub fn has_changes(&self) -> bool {
        self.added + self.updated + self.deleted > 0
    }
}
