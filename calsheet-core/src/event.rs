//! Provider-neutral event types.
//!
//! Event stores convert their API responses into these types, and the
//! reconciliation engine works exclusively with them.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A calendar event as reported by an event store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    pub start: EventTime,
    /// Exclusive end. For all-day events this is the day after the last day.
    pub end: EventTime,
    /// Guest email addresses, in the order the store reports them.
    #[serde(default)]
    pub guests: Vec<String>,
}

impl Event {
    pub fn is_all_day(&self) -> bool {
        matches!(self.start, EventTime::Date(_))
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventTime {
    DateTime(DateTime<Utc>),
    Date(NaiveDate),
}

/// Fields of an event to be created, apart from its timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub location: String,
    pub guests: Vec<String>,
    pub send_invites: bool,
}

/// When an event to be created takes place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventTiming {
    Timed {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    /// Inclusive range of whole days.
    AllDay {
        first_day: NaiveDate,
        last_day: NaiveDate,
    },
}
