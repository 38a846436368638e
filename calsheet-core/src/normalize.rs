//! Conversion of events and rows into canonical records, and back.
//!
//! Both stores are normalized into [`Record`] so that equality is meaningful
//! across representations. All-day events follow an inclusive end
//! convention: a single-day event has no end, a longer one ends on the last
//! second of its last day.

use std::fmt;

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::cell::{Cell, Row};
use crate::event::{Event, EventDraft, EventTime, EventTiming};
use crate::field_map::{FieldKey, FieldMap};
use crate::record::{Record, Timestamp, normalize_guests};

/// Why a row cannot become a create or update candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowIssue {
    MissingTitle,
    InvalidStart,
    InvalidEnd,
    EndBeforeStart,
}

impl fmt::Display for RowIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            RowIssue::MissingTitle => "must have title",
            RowIssue::InvalidStart => "start time must be a date/time",
            RowIssue::InvalidEnd => "end time must be empty or a date/time",
            RowIssue::EndBeforeStart => "end time must be after start time",
        };
        write!(f, "{msg}")
    }
}

/// Normalize a calendar event, expressing its times as wall-clock in `tz`.
pub fn from_event(event: &Event, tz: Tz) -> Record {
    let starttime = event_timestamp(&event.start, tz);
    let endtime = if event.is_all_day() {
        all_day_end(starttime, event_timestamp(&event.end, tz))
    } else {
        Some(event_timestamp(&event.end, tz))
    };

    Record {
        id: event.id.clone(),
        title: event.title.clone(),
        description: event.description.clone(),
        location: event.location.clone(),
        starttime,
        endtime,
        guests: normalize_guests(event.guests.iter().map(String::as_str)),
    }
}

fn event_timestamp(time: &EventTime, tz: Tz) -> Timestamp {
    match time {
        EventTime::DateTime(dt) => Timestamp::DateTime(dt.with_timezone(&tz).naive_local()),
        EventTime::Date(d) => Timestamp::Date(*d),
    }
}

fn all_day_end(start: Timestamp, raw_end: Timestamp) -> Option<Timestamp> {
    let start = start.as_naive();
    let end = raw_end.as_naive();

    if end - start <= TimeDelta::days(1) {
        return None;
    }
    if end.time() == NaiveTime::MIN {
        return Some(Timestamp::DateTime(end - TimeDelta::seconds(1)));
    }
    Some(raw_end)
}

/// Normalize a table row, validating the fields a usable record needs.
pub fn from_row(row: &[Cell], map: &FieldMap) -> Result<Record, RowIssue> {
    let cell = |key: FieldKey| map.position(key).and_then(|i| row.get(i));
    let text = |key: FieldKey| cell(key).map(Cell::to_string).unwrap_or_default();

    let title = text(FieldKey::Title);
    if title.is_empty() {
        return Err(RowIssue::MissingTitle);
    }

    let starttime = cell(FieldKey::StartTime)
        .and_then(Timestamp::from_cell)
        .ok_or(RowIssue::InvalidStart)?;

    let endtime = match cell(FieldKey::EndTime) {
        None | Some(Cell::Empty) => None,
        Some(c) => Some(Timestamp::from_cell(c).ok_or(RowIssue::InvalidEnd)?),
    };

    if let Some(end) = endtime
        && end.as_naive() < starttime.as_naive()
    {
        return Err(RowIssue::EndBeforeStart);
    }

    Ok(Record {
        id: text(FieldKey::Id),
        title,
        description: text(FieldKey::Description),
        location: text(FieldKey::Location),
        starttime,
        endtime,
        guests: normalize_guests([text(FieldKey::Guests).as_str()]),
    })
}

/// The raw title of a row, for messages about rows that failed validation.
pub fn row_title(row: &[Cell], map: &FieldMap) -> String {
    map.position(FieldKey::Title)
        .and_then(|i| row.get(i))
        .map(Cell::to_string)
        .unwrap_or_default()
}

/// The raw id of a row, if it has a non-empty one.
pub fn row_id(row: &[Cell], map: &FieldMap) -> Option<String> {
    let id = map.position(FieldKey::Id).and_then(|i| row.get(i))?.to_string();
    (!id.is_empty()).then_some(id)
}

/// Project a record onto `existing`, touching only mapped columns.
pub fn to_row(record: &Record, map: &FieldMap, existing: &[Cell]) -> Row {
    let mut row = existing.to_vec();
    if row.len() < map.width() {
        row.resize(map.width(), Cell::Empty);
    }
    for (position, key) in map.mapped() {
        row[position] = field_cell(record, key);
    }
    row
}

fn field_cell(record: &Record, key: FieldKey) -> Cell {
    match key {
        FieldKey::Id => Cell::text_or_empty(&record.id),
        FieldKey::Title => Cell::text_or_empty(&record.title),
        FieldKey::Description => Cell::text_or_empty(&record.description),
        FieldKey::Location => Cell::text_or_empty(&record.location),
        FieldKey::StartTime => record.starttime.to_cell(),
        FieldKey::EndTime => record.endtime.map(Timestamp::to_cell).unwrap_or_default(),
        FieldKey::Guests => Cell::text_or_empty(&record.guests),
    }
}

/// Field-by-field equality, ignoring ids.
///
/// Two records without an end are both single all-day events, so only the
/// day of their start is compared.
pub fn records_equal(a: &Record, b: &Record) -> bool {
    let times_match = match (&a.endtime, &b.endtime) {
        (None, None) => a.starttime.date() == b.starttime.date(),
        (Some(x), Some(y)) => a.starttime.same_instant(&b.starttime) && x.same_instant(y),
        _ => false,
    };

    a.title == b.title
        && a.description == b.description
        && a.location == b.location
        && times_match
        && a.guests == b.guests
}

/// The event fields a record creates, apart from timing.
pub fn to_draft(record: &Record, send_invites: bool) -> EventDraft {
    EventDraft {
        title: record.title.clone(),
        description: record.description.clone(),
        location: record.location.clone(),
        guests: record.guest_list(),
        send_invites,
    }
}

/// How a record is scheduled when written to the calendar.
///
/// An empty end is a single all-day event. A date start with an end on the
/// last second of a day is a multi-day all-day event, the inverse of the
/// convention [`from_event`] applies. Anything else is a timed event.
pub fn to_timing(record: &Record, tz: Tz) -> Result<EventTiming, RowIssue> {
    let Some(end) = record.endtime else {
        let day = record.starttime.date();
        return Ok(EventTiming::AllDay {
            first_day: day,
            last_day: day,
        });
    };

    if let Timestamp::Date(first_day) = record.starttime
        && let Some(last_day) = last_second_of_day(end.as_naive())
        && last_day >= first_day
    {
        return Ok(EventTiming::AllDay {
            first_day,
            last_day,
        });
    }

    Ok(EventTiming::Timed {
        start: to_utc(record.starttime.as_naive(), tz).ok_or(RowIssue::InvalidStart)?,
        end: to_utc(end.as_naive(), tz).ok_or(RowIssue::InvalidEnd)?,
    })
}

fn last_second_of_day(dt: NaiveDateTime) -> Option<NaiveDate> {
    let next = dt + TimeDelta::seconds(1);
    (next.time() == NaiveTime::MIN).then(|| next.date() - Days::new(1))
}

/// The instant a wall-clock time denotes in `tz`. Ambiguous times take the
/// earlier instant; times skipped by a daylight-saving jump move forward
/// by the usual one-hour gap.
fn resolve_local(naive: NaiveDateTime, tz: Tz) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + TimeDelta::hours(1))).earliest())
}

fn to_utc(naive: NaiveDateTime, tz: Tz) -> Option<DateTime<Utc>> {
    resolve_local(naive, tz).map(|dt| dt.with_timezone(&Utc))
}

/// Rewrite wall-clock times that do not exist in `tz` to the time the
/// calendar will report once the event is written.
pub fn in_zone(record: &Record, tz: Tz) -> Record {
    let settle = |ts: Timestamp| match ts {
        Timestamp::DateTime(dt) => resolve_local(dt, tz)
            .map(|local| Timestamp::DateTime(local.naive_local()))
            .unwrap_or(ts),
        Timestamp::Date(_) => ts,
    };

    Record {
        starttime: settle(record.starttime),
        endtime: record.endtime.map(settle),
        ..record.clone()
    }
}
