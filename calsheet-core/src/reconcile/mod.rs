//! The two directions of a reconciliation pass.
//!
//! A pass reads both stores once, pairs records by id and applies the
//! difference to one side. [`ReconcilePull`] makes the table mirror the
//! calendar; [`ReconcilePush`] makes the calendar mirror the table.

mod pull;
mod push;
mod report;

pub use pull::ReconcilePull;
pub use push::ReconcilePush;
pub use report::{PullReport, PushReport, SkippedRow};

use crate::cell::Cell;
use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::field_map::FieldMap;

/// Map `header`, failing with the missing labels when a required column is absent.
fn map_header(header: &[Cell], config: &SyncConfig) -> SyncResult<FieldMap> {
    let (map, missing) = FieldMap::build(header, &config.labels, &config.required_fields);
    if !missing.is_empty() {
        return Err(SyncError::Schema {
            missing: config.labels.labels_for(&missing),
        });
    }
    Ok(map)
}
