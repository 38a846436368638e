//! In-memory stores for exercising the drivers.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, Utc};

use crate::cell::{Cell, Row};
use crate::date_range::DateRange;
use crate::error::{SyncError, SyncResult};
use crate::event::{Event, EventDraft, EventTime, EventTiming};
use crate::store::{EventStore, TableStore, UserPrompt};

pub fn utc(s: &str) -> DateTime<Utc> {
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").unwrap();
    naive.and_utc()
}

pub fn local(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").unwrap()
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn timed_event(id: &str, title: &str, start: &str, end: &str) -> Event {
    Event {
        id: id.to_string(),
        title: title.to_string(),
        description: String::new(),
        location: String::new(),
        start: EventTime::DateTime(utc(start)),
        end: EventTime::DateTime(utc(end)),
        guests: vec![],
    }
}

/// A calendar held in memory. Ids are handed out as `evt-1`, `evt-2`, ...
#[derive(Default)]
pub struct MemoryCalendar {
    events: Mutex<Vec<Event>>,
    next_id: AtomicUsize,
    mutations: AtomicUsize,
    updatable: bool,
    /// Mutating calls that succeed before every further one fails.
    fail_after: Option<usize>,
}

impl MemoryCalendar {
    pub fn with_events(events: Vec<Event>) -> Self {
        MemoryCalendar {
            events: Mutex::new(events),
            ..Default::default()
        }
    }

    pub fn updatable(mut self) -> Self {
        self.updatable = true;
        self
    }

    pub fn failing_after(mut self, mutations: usize) -> Self {
        self.fail_after = Some(mutations);
        self
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn titles(&self) -> Vec<String> {
        self.events().into_iter().map(|e| e.title).collect()
    }

    pub fn mutations(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    fn mutate(&self) -> SyncResult<()> {
        let done = self.mutations.fetch_add(1, Ordering::SeqCst);
        match self.fail_after {
            Some(limit) if done >= limit => Err(SyncError::Capability("quota exceeded".into())),
            _ => Ok(()),
        }
    }

    fn insert(&self, draft: &EventDraft, start: EventTime, end: EventTime) -> Event {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let event = Event {
            id: format!("evt-{n}"),
            title: draft.title.clone(),
            description: draft.description.clone(),
            location: draft.location.clone(),
            start,
            end,
            guests: draft.guests.clone(),
        };
        self.events.lock().unwrap().push(event.clone());
        event
    }
}

fn event_instant(time: &EventTime) -> DateTime<Utc> {
    match time {
        EventTime::DateTime(dt) => *dt,
        EventTime::Date(d) => d.and_time(chrono::NaiveTime::MIN).and_utc(),
    }
}

fn timing_bounds(timing: &EventTiming) -> (EventTime, EventTime) {
    match timing {
        EventTiming::Timed { start, end } => (EventTime::DateTime(*start), EventTime::DateTime(*end)),
        EventTiming::AllDay {
            first_day,
            last_day,
        } => (
            EventTime::Date(*first_day),
            EventTime::Date(*last_day + Days::new(1)),
        ),
    }
}

impl EventStore for MemoryCalendar {
    async fn list_events(&self, range: &DateRange) -> SyncResult<Vec<Event>> {
        Ok(self
            .events()
            .into_iter()
            .filter(|e| range.contains(event_instant(&e.start)))
            .collect())
    }

    async fn create_event(
        &self,
        draft: &EventDraft,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> SyncResult<Event> {
        self.mutate()?;
        Ok(self.insert(draft, EventTime::DateTime(start), EventTime::DateTime(end)))
    }

    async fn create_all_day_event(
        &self,
        draft: &EventDraft,
        first_day: NaiveDate,
        last_day: NaiveDate,
    ) -> SyncResult<Event> {
        self.mutate()?;
        let (start, end) = timing_bounds(&EventTiming::AllDay {
            first_day,
            last_day,
        });
        Ok(self.insert(draft, start, end))
    }

    async fn delete_event(&self, id: &str) -> SyncResult<()> {
        self.mutate()?;
        let mut events = self.events.lock().unwrap();
        let before = events.len();
        events.retain(|e| e.id != id);
        if events.len() == before {
            return Err(SyncError::Capability(format!("no event {id}")));
        }
        Ok(())
    }

    fn supports_update(&self) -> bool {
        self.updatable
    }

    async fn update_event(
        &self,
        id: &str,
        draft: &EventDraft,
        timing: &EventTiming,
    ) -> SyncResult<Event> {
        if !self.updatable {
            return Err(SyncError::UpdateUnsupported);
        }
        self.mutate()?;
        let mut events = self.events.lock().unwrap();
        let event = events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| SyncError::Capability(format!("no event {id}")))?;
        let (start, end) = timing_bounds(timing);
        event.title = draft.title.clone();
        event.description = draft.description.clone();
        event.location = draft.location.clone();
        event.guests = draft.guests.clone();
        event.start = start;
        event.end = end;
        Ok(event.clone())
    }
}

/// A table held in memory that counts every mutating call.
#[derive(Debug, Default)]
pub struct MemoryTable {
    pub rows: Vec<Row>,
    pub formats: BTreeMap<usize, String>,
    pub hidden: BTreeSet<usize>,
    pub writes: usize,
}

impl MemoryTable {
    pub fn with_rows(rows: Vec<Row>) -> Self {
        MemoryTable {
            rows,
            ..Default::default()
        }
    }
}

impl TableStore for MemoryTable {
    fn read_all(&self) -> SyncResult<Vec<Row>> {
        Ok(self.rows.clone())
    }

    fn write_all(&mut self, rows: &[Row]) -> SyncResult<()> {
        self.writes += 1;
        for (i, row) in rows.iter().enumerate() {
            match self.rows.get_mut(i) {
                Some(existing) => *existing = row.clone(),
                None => self.rows.push(row.clone()),
            }
        }
        Ok(())
    }

    fn write_column(&mut self, col: usize, cells: &[Cell]) -> SyncResult<()> {
        self.writes += 1;
        for (i, cell) in cells.iter().enumerate() {
            if self.rows.len() <= i {
                self.rows.resize(i + 1, Vec::new());
            }
            let row = &mut self.rows[i];
            if row.len() <= col {
                row.resize(col + 1, Cell::Empty);
            }
            row[col] = cell.clone();
        }
        Ok(())
    }

    fn delete_trailing_rows(&mut self, from: usize, count: usize) -> SyncResult<()> {
        self.writes += 1;
        let end = (from + count).min(self.rows.len());
        if from < end {
            self.rows.drain(from..end);
        }
        Ok(())
    }

    fn set_column_format(&mut self, col: usize, pattern: &str) -> SyncResult<()> {
        self.writes += 1;
        self.formats.insert(col, pattern.to_string());
        Ok(())
    }

    fn hide_column(&mut self, col: usize) -> SyncResult<()> {
        self.writes += 1;
        self.hidden.insert(col);
        Ok(())
    }
}

/// Answers every confirmation the same way and records what it was shown.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answer: bool,
    pub alerts: RefCell<Vec<String>>,
    pub confirms: RefCell<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn answering(answer: bool) -> Self {
        ScriptedPrompt {
            answer,
            ..Default::default()
        }
    }
}

impl UserPrompt for ScriptedPrompt {
    fn alert(&self, message: &str) {
        self.alerts.borrow_mut().push(message.to_string());
    }

    fn confirm(&self, message: &str) -> bool {
        self.confirms.borrow_mut().push(message.to_string());
        self.answer
    }
}
