use tracing::{debug, info};

use crate::cell::{Cell, Row};
use crate::config::SyncConfig;
use crate::date_range::DateRange;
use crate::error::SyncResult;
use crate::field_map::{FieldKey, FieldMap};
use crate::matcher::{Identified, MatchKind, match_records};
use crate::normalize::{self, RowIssue};
use crate::reconcile::{PullReport, map_header};
use crate::record::Record;
use crate::store::{EventStore, TableStore};

/// A body row as the matcher sees it. Rows that fail validation keep
/// their id so they are overwritten rather than duplicated.
struct TableRow {
    id: Option<String>,
    record: Result<Record, RowIssue>,
}

impl Identified for TableRow {
    fn identifier(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

/// Calendar to table.
pub struct ReconcilePull<'a> {
    config: &'a SyncConfig,
}

impl<'a> ReconcilePull<'a> {
    pub fn new(config: &'a SyncConfig) -> Self {
        ReconcilePull { config }
    }

    /// Rewrite the table so that its body holds exactly the events in `range`.
    ///
    /// Matched rows are overwritten in place, keeping their unmapped cells and
    /// their position. New events are appended. Rows without an event are
    /// removed. The table is written with a single bulk call, and not at all
    /// when it already mirrors the calendar.
    pub async fn run<E, T>(
        &self,
        calendar: &E,
        table: &mut T,
        range: &DateRange,
    ) -> SyncResult<PullReport>
    where
        E: EventStore,
        T: TableStore,
    {
        info!(from = %range.from_rfc3339(), to = %range.to_rfc3339(), "pulling events into table");

        let events = calendar.list_events(range).await?;
        let mut rows = table.read_all()?;
        let mut report = PullReport::default();

        if rows.first().is_none_or(|header| header.iter().all(Cell::is_blank)) {
            let header = self.config.labels.header_row();
            match rows.first_mut() {
                Some(first) => *first = header,
                None => rows.push(header),
            }
            report.header_initialized = true;
            debug!("table had no header, using the reference header");
        }

        let map = map_header(&rows[0], self.config)?;

        let source: Vec<Record> = events
            .iter()
            .map(|event| normalize::from_event(event, self.config.timezone))
            .collect();
        let dest: Vec<TableRow> = rows[1..]
            .iter()
            .map(|row| TableRow {
                id: normalize::row_id(row, &map),
                record: normalize::from_row(row, &map),
            })
            .collect();

        let matched = match_records(&source, &dest, |event, row| {
            row.record
                .as_ref()
                .is_ok_and(|record| normalize::records_equal(event, record))
        });

        let mut body: Vec<Row> = rows[1..].to_vec();
        let mut retained = vec![false; body.len()];
        let mut appended = Vec::new();

        for m in &matched.matches {
            let record = &source[m.source];
            match (m.kind, m.dest) {
                (MatchKind::Unchanged, Some(d)) => {
                    retained[d] = true;
                    report.unchanged += 1;
                }
                (_, Some(d)) => {
                    retained[d] = true;
                    body[d] = normalize::to_row(record, &map, &body[d]);
                    report.updated += 1;
                    debug!(id = %record.id, row = d + 1, "updating row");
                }
                (_, None) => {
                    appended.push(normalize::to_row(record, &map, &[]));
                    report.created += 1;
                    debug!(id = %record.id, title = %record.title, "appending row");
                }
            }
        }
        report.deleted = retained.iter().filter(|kept| !**kept).count();

        if !report.has_changes() {
            info!(unchanged = report.unchanged, "table already up to date");
            return Ok(report);
        }

        let previous_len = rows.len();
        let mut output = Vec::with_capacity(1 + body.len() + appended.len());
        output.push(std::mem::take(&mut rows[0]));
        output.extend(
            body.into_iter()
                .zip(retained)
                .filter_map(|(row, kept)| kept.then_some(row)),
        );
        output.extend(appended);

        table.write_all(&output)?;
        if output.len() < previous_len {
            table.delete_trailing_rows(output.len(), previous_len - output.len())?;
        }
        if report.header_initialized {
            self.format_new_table(table, &map)?;
        }

        info!(
            created = report.created,
            updated = report.updated,
            deleted = report.deleted,
            unchanged = report.unchanged,
            "pull finished"
        );
        Ok(report)
    }

    fn format_new_table<T: TableStore>(&self, table: &mut T, map: &FieldMap) -> SyncResult<()> {
        for key in [FieldKey::StartTime, FieldKey::EndTime] {
            if let Some(col) = map.position(key) {
                table.set_column_format(col, &self.config.datetime_format)?;
            }
        }
        if let Some(col) = map.position(FieldKey::Id) {
            table.hide_column(col)?;
        }
        Ok(())
    }
}
