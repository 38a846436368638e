use tracing::{debug, info, warn};

use crate::cell::{Cell, Row};
use crate::config::{SyncConfig, UpdateStrategy};
use crate::date_range::DateRange;
use crate::error::{SyncError, SyncResult};
use crate::event::{Event, EventDraft, EventTiming};
use crate::field_map::FieldKey;
use crate::matcher::{Identified, MatchKind, MatchResult, match_records};
use crate::normalize;
use crate::reconcile::{PushReport, SkippedRow, map_header};
use crate::record::Record;
use crate::store::{EventStore, TableStore, UserPrompt};
use crate::throttle::ThrottledWriter;

/// A valid body row and where it sits in the table.
struct RowRecord {
    row: usize,
    record: Record,
}

impl Identified for RowRecord {
    fn identifier(&self) -> Option<&str> {
        self.record.identifier()
    }
}

/// The id column, collected during the pass and written back once.
struct IdColumn {
    col: Option<usize>,
    cells: Vec<Cell>,
    dirty: bool,
}

impl IdColumn {
    fn new(rows: &[Row], col: Option<usize>) -> Self {
        let cells = rows
            .iter()
            .map(|row| col.and_then(|c| row.get(c)).cloned().unwrap_or_default())
            .collect();
        IdColumn {
            col,
            cells,
            dirty: false,
        }
    }

    fn set(&mut self, row: usize, id: &str) {
        if self.col.is_none() {
            warn!(row, id, "table has no id column, new event id not recorded");
            return;
        }
        self.cells[row] = Cell::text(id);
        self.dirty = true;
    }

    fn flush<T: TableStore>(&mut self, table: &mut T) -> SyncResult<()> {
        if let (Some(col), true) = (self.col, self.dirty) {
            debug!(col, "writing back event ids");
            table.write_column(col, &self.cells)?;
            self.dirty = false;
        }
        Ok(())
    }
}

/// Table to calendar.
pub struct ReconcilePush<'a> {
    config: &'a SyncConfig,
}

impl<'a> ReconcilePush<'a> {
    pub fn new(config: &'a SyncConfig) -> Self {
        ReconcilePush { config }
    }

    /// Make the calendar mirror the table's body rows.
    ///
    /// Rows that fail validation are reported through `prompt` and skipped.
    /// New events have their ids written back into the table, even when a
    /// later calendar call fails. Events without a row are deleted, subject
    /// to the configured [`DeletionPolicy`](crate::config::DeletionPolicy).
    pub async fn run<E, T, P>(
        &self,
        calendar: &E,
        table: &mut T,
        prompt: &P,
        range: &DateRange,
    ) -> SyncResult<PushReport>
    where
        E: EventStore,
        T: TableStore,
        P: UserPrompt,
    {
        info!(from = %range.from_rfc3339(), to = %range.to_rfc3339(), "pushing table to calendar");

        let rows = table.read_all()?;
        if rows.len() < 2 {
            return Err(SyncError::EmptyTable);
        }
        let map = map_header(&rows[0], self.config)?;

        let events = calendar.list_events(range).await?;
        let existing: Vec<Record> = events
            .iter()
            .map(|event| normalize::from_event(event, self.config.timezone))
            .collect();

        let mut report = PushReport::default();
        let mut candidates = Vec::new();

        for (i, row) in rows.iter().enumerate().skip(1) {
            if row.iter().all(Cell::is_blank) {
                continue;
            }
            match normalize::from_row(row, &map) {
                Ok(record) => candidates.push(RowRecord {
                    row: i,
                    record: normalize::in_zone(&record, self.config.timezone),
                }),
                Err(issue) => {
                    skip(
                        prompt,
                        &mut report,
                        SkippedRow {
                            row: i + 1,
                            title: normalize::row_title(row, &map),
                            issue,
                        },
                    );
                }
            }
        }

        let matched = match_records(&candidates, &existing, |row, event| {
            normalize::records_equal(&row.record, event)
        });

        let mut writer = ThrottledWriter::new(calendar, self.config.throttle);
        let mut ids = IdColumn::new(&rows, map.position(FieldKey::Id));

        let applied = self
            .apply_rows(&mut writer, prompt, &candidates, &existing, &matched, &mut ids, &mut report)
            .await;
        ids.flush(table)?;
        applied?;

        let doomed: Vec<&Event> = matched
            .dest_only
            .iter()
            .map(|d| &events[*d])
            .filter(|event| !event.id.is_empty())
            .collect();
        self.delete_orphans(&mut writer, prompt, &doomed, &mut report)
            .await?;

        info!(
            added = report.added,
            updated = report.updated,
            deleted = report.deleted,
            unchanged = report.unchanged,
            skipped = report.skipped.len(),
            "push finished"
        );
        Ok(report)
    }

    #[allow(clippy::too_many_arguments)]
    async fn apply_rows<E: EventStore, P: UserPrompt>(
        &self,
        writer: &mut ThrottledWriter<'_, E>,
        prompt: &P,
        candidates: &[RowRecord],
        existing: &[Record],
        matched: &MatchResult,
        ids: &mut IdColumn,
        report: &mut PushReport,
    ) -> SyncResult<()> {
        for m in &matched.matches {
            let RowRecord { row, record } = &candidates[m.source];
            if m.kind == MatchKind::Unchanged {
                report.unchanged += 1;
                continue;
            }

            let timing = match normalize::to_timing(record, self.config.timezone) {
                Ok(timing) => timing,
                Err(issue) => {
                    skip(
                        prompt,
                        report,
                        SkippedRow {
                            row: row + 1,
                            title: record.title.clone(),
                            issue,
                        },
                    );
                    continue;
                }
            };
            let draft = normalize::to_draft(record, self.config.send_invites);

            match m.dest {
                None => {
                    let created = writer.create(&draft, &timing).await?;
                    debug!(row, id = %created.id, title = %created.title, "created event");
                    ids.set(*row, &created.id);
                    report.added += 1;
                }
                Some(d) => {
                    let written = self
                        .rewrite(writer, &existing[d].id, &draft, &timing)
                        .await?;
                    debug!(row, old = %existing[d].id, new = %written.id, "updated event");
                    if written.id != record.id {
                        ids.set(*row, &written.id);
                    }
                    report.updated += 1;
                }
            }
        }
        Ok(())
    }

    async fn rewrite<E: EventStore>(
        &self,
        writer: &mut ThrottledWriter<'_, E>,
        id: &str,
        draft: &EventDraft,
        timing: &EventTiming,
    ) -> SyncResult<Event> {
        let in_place = match self.config.update_strategy {
            UpdateStrategy::Auto => writer.store().supports_update(),
            UpdateStrategy::Recreate => false,
        };
        if in_place {
            return writer.update(id, draft, timing).await;
        }
        writer.delete(id).await?;
        writer.create(draft, timing).await
    }

    async fn delete_orphans<E: EventStore, P: UserPrompt>(
        &self,
        writer: &mut ThrottledWriter<'_, E>,
        prompt: &P,
        doomed: &[&Event],
        report: &mut PushReport,
    ) -> SyncResult<()> {
        if doomed.is_empty() {
            return Ok(());
        }

        let confirmed = !self
            .config
            .deletion_policy
            .needs_confirmation(doomed.len(), report.updated)
            || prompt.confirm(&format!(
                "Delete {} calendar event(s) not found in the table?",
                doomed.len()
            ));

        if !confirmed {
            info!(count = doomed.len(), "deletion declined, keeping events");
            report.declined = doomed.len();
            return Ok(());
        }

        for event in doomed {
            writer.delete(&event.id).await?;
            debug!(id = %event.id, title = %event.title, "deleted event");
            report.deleted += 1;
        }
        Ok(())
    }
}

fn skip<P: UserPrompt>(prompt: &P, report: &mut PushReport, skipped: SkippedRow) {
    let message = skipped.to_error().to_string();
    warn!(row = skipped.row, title = %skipped.title, issue = %skipped.issue, "skipping row");
    prompt.alert(&message);
    report.skipped.push(skipped);
}
