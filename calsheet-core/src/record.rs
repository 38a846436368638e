//! The canonical in-memory record both stores are normalized into.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::cell::Cell;

/// A point in wall-clock time, or a bare date for all-day semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timestamp {
    DateTime(NaiveDateTime),
    Date(NaiveDate),
}

impl Timestamp {
    /// The instant this timestamp denotes. A bare date is its midnight.
    pub fn as_naive(&self) -> NaiveDateTime {
        match self {
            Timestamp::DateTime(dt) => *dt,
            Timestamp::Date(d) => d.and_time(NaiveTime::MIN),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.as_naive().date()
    }

    /// Value equality to the millisecond.
    pub fn same_instant(&self, other: &Timestamp) -> bool {
        let millis = |t: &Timestamp| t.as_naive().and_utc().timestamp_millis();
        millis(self) == millis(other)
    }

    pub fn from_cell(cell: &Cell) -> Option<Self> {
        match cell {
            Cell::DateTime(dt) => Some(Timestamp::DateTime(*dt)),
            Cell::Date(d) => Some(Timestamp::Date(*d)),
            _ => None,
        }
    }

    pub fn to_cell(self) -> Cell {
        match self {
            Timestamp::DateTime(dt) => Cell::DateTime(dt),
            Timestamp::Date(d) => Cell::Date(d),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timestamp::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M")),
            Timestamp::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

/// One event or row, with the fields both stores share.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Empty for a row not yet linked to a calendar event.
    pub id: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub starttime: Timestamp,
    /// `None` means all-day, single day.
    pub endtime: Option<Timestamp>,
    /// Comma-joined guest addresses.
    pub guests: String,
}

impl Record {
    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }

    pub fn guest_list(&self) -> Vec<String> {
        if self.guests.is_empty() {
            return Vec::new();
        }
        self.guests.split(',').map(String::from).collect()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Trim each address, drop blanks and re-join with `,`.
pub fn normalize_guests<'a>(guests: impl IntoIterator<Item = &'a str>) -> String {
    guests
        .into_iter()
        .flat_map(|g| g.split(','))
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_equals_its_midnight() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let date = Timestamp::Date(day);
        let midnight = Timestamp::DateTime(day.and_hms_opt(0, 0, 0).unwrap());
        assert!(date.same_instant(&midnight));
        assert_ne!(date, midnight);
    }

    #[test]
    fn test_same_instant_ignores_sub_millisecond() {
        let base = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_micro_opt(9, 0, 0, 100)
            .unwrap();
        let other = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_micro_opt(9, 0, 0, 900)
            .unwrap();
        assert!(Timestamp::DateTime(base).same_instant(&Timestamp::DateTime(other)));
    }

    #[test]
    fn test_normalize_guests() {
        assert_eq!(
            normalize_guests([" a@x.com, b@y.com ", "", "c@z.com"]),
            "a@x.com,b@y.com,c@z.com"
        );
        assert_eq!(normalize_guests(std::iter::empty()), "");
    }
}
