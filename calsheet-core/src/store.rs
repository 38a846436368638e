//! Capabilities the reconciliation engine consumes from its collaborators.

use chrono::{DateTime, NaiveDate, Utc};

use crate::cell::{Cell, Row};
use crate::date_range::DateRange;
use crate::error::{SyncError, SyncResult};
use crate::event::{Event, EventDraft, EventTiming};

/// A calendar that can list, create and delete events.
#[allow(async_fn_in_trait)]
pub trait EventStore {
    async fn list_events(&self, range: &DateRange) -> SyncResult<Vec<Event>>;

    async fn create_event(
        &self,
        draft: &EventDraft,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> SyncResult<Event>;

    /// Create an event covering whole days, `last_day` inclusive.
    async fn create_all_day_event(
        &self,
        draft: &EventDraft,
        first_day: NaiveDate,
        last_day: NaiveDate,
    ) -> SyncResult<Event>;

    async fn delete_event(&self, id: &str) -> SyncResult<()>;

    /// Whether [`EventStore::update_event`] is available.
    fn supports_update(&self) -> bool {
        false
    }

    /// Rewrite an existing event in place, keeping its id where the store allows.
    async fn update_event(
        &self,
        _id: &str,
        _draft: &EventDraft,
        _timing: &EventTiming,
    ) -> SyncResult<Event> {
        Err(SyncError::UpdateUnsupported)
    }
}

/// A positional table whose first row is the header.
pub trait TableStore {
    fn read_all(&self) -> SyncResult<Vec<Row>>;

    /// Replace the first `rows.len()` rows with `rows`.
    fn write_all(&mut self, rows: &[Row]) -> SyncResult<()>;

    /// Overwrite column `col`, starting at row 0, with `cells`.
    fn write_column(&mut self, col: usize, cells: &[Cell]) -> SyncResult<()>;

    fn delete_trailing_rows(&mut self, from: usize, count: usize) -> SyncResult<()>;

    fn set_column_format(&mut self, col: usize, pattern: &str) -> SyncResult<()>;

    fn hide_column(&mut self, col: usize) -> SyncResult<()>;
}

/// The person invoking a pass.
pub trait UserPrompt {
    fn alert(&self, message: &str);

    /// Ask a yes/no question. `false` unless the answer is an explicit yes.
    fn confirm(&self, message: &str) -> bool;
}
