//! Error types for calsheet reconciliation.

use thiserror::Error;

use crate::normalize::RowIssue;

/// Errors that can occur while reconciling a calendar and a table.
#[derive(Error, Debug)]
pub enum SyncError {
    /// A store is unreachable or misconfigured. Raised before anything is read.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The table header lacks required columns. Nothing was mutated.
    #[error("Table must have {} columns", missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("Table must have a title row and at least one data row")]
    EmptyTable,

    #[error("Skipping row: {issue} in event \"{title}\", row {row}")]
    RowValidation {
        row: usize,
        title: String,
        issue: RowIssue,
    },

    /// A create, update or delete call on the event store failed.
    #[error("Calendar operation failed: {0}")]
    Capability(String),

    #[error("Event store does not support in-place updates")]
    UpdateUnsupported,

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Provider '{0}' not found in PATH")]
    ProviderNotInstalled(String),

    #[error("Provider request timed out after {0}s")]
    ProviderTimeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for calsheet operations.
pub type SyncResult<T> = Result<T, SyncError>;
