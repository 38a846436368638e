//! Core of calsheet: mirrors a calendar against a spreadsheet-like table.
//!
//! This crate provides the reconciliation engine used by the calsheet CLI:
//! - `field_map`, `normalize` and `matcher` turn both stores into comparable records
//! - `reconcile` holds the pull (calendar to table) and push (table to calendar) passes
//! - `store` defines the capabilities the passes need from their collaborators
//! - `remote` implements the calendar side over the provider protocol

pub mod cell;
pub mod config;
pub mod date_range;
pub mod error;
pub mod event;
pub mod field_map;
pub mod matcher;
pub mod normalize;
pub mod reconcile;
pub mod record;
pub mod remote;
pub mod store;
pub mod throttle;

#[cfg(test)]
pub(crate) mod testing;

pub use cell::{Cell, Row};
pub use config::{AppConfig, DeletionPolicy, SyncConfig, UpdateStrategy};
pub use date_range::DateRange;
pub use error::{SyncError, SyncResult};
pub use event::{Event, EventDraft, EventTime, EventTiming};
pub use reconcile::{PullReport, PushReport, ReconcilePull, ReconcilePush, SkippedRow};
pub use store::{EventStore, TableStore, UserPrompt};
