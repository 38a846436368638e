//! Defines the JSON protocol used for communication between calsheet
//! and provider binaries over stdin/stdout.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::event::{Event, EventDraft, EventTiming};

pub trait ProviderCommand: Serialize {
    type Response: DeserializeOwned;
    fn command() -> Command;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    ListEvents,
    CreateEvent,
    UpdateEvent,
    DeleteEvent,
}

/// Request sent from calsheet to provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    pub command: Command,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Response sent from provider to calsheet.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response<T> {
    Success { data: T },
    Error { error: String },
}

/// List events within a time range.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListEvents {
    /// Provider-specific config (e.g., google_calendar_id)
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub from: String,
    pub to: String,
}

impl ProviderCommand for ListEvents {
    type Response = Vec<Event>;
    fn command() -> Command {
        Command::ListEvents
    }
}

/// Create a new event.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateEvent {
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub event: EventDraft,
    pub timing: EventTiming,
}

impl ProviderCommand for CreateEvent {
    type Response = Event;
    fn command() -> Command {
        Command::CreateEvent
    }
}

/// Rewrite an existing event in place.
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateEvent {
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub event_id: String,
    pub event: EventDraft,
    pub timing: EventTiming,
}

impl ProviderCommand for UpdateEvent {
    type Response = Event;
    fn command() -> Command {
        Command::UpdateEvent
    }
}

/// Delete an event by ID.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteEvent {
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub event_id: String,
}

impl ProviderCommand for DeleteEvent {
    type Response = ();
    fn command() -> Command {
        Command::DeleteEvent
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn test_create_event_request_shape() {
        let mut remote_config = serde_json::Map::new();
        remote_config.insert("google_calendar_id".into(), "primary".into());
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        let cmd = CreateEvent {
            remote_config,
            event: EventDraft {
                title: "Lunch".into(),
                description: String::new(),
                location: String::new(),
                guests: vec!["a@example.com".into()],
                send_invites: false,
            },
            timing: EventTiming::AllDay {
                first_day: day,
                last_day: day,
            },
        };
        let request = Request {
            command: CreateEvent::command(),
            params: serde_json::to_value(cmd).unwrap(),
        };
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["command"], "create_event");
        assert_eq!(json["params"]["google_calendar_id"], "primary");
        assert_eq!(json["params"]["event"]["title"], "Lunch");
        assert_eq!(json["params"]["timing"]["kind"], "all_day");
        assert_eq!(json["params"]["timing"]["first_day"], "2024-03-01");
    }

    #[test]
    fn test_parse_responses() {
        let ok: Response<()> = serde_json::from_str(r#"{"status":"success","data":null}"#).unwrap();
        assert!(matches!(ok, Response::Success { .. }));

        let err: Response<Vec<Event>> =
            serde_json::from_str(r#"{"status":"error","error":"rate limited"}"#).unwrap();
        match err {
            Response::Error { error } => assert_eq!(error, "rate limited"),
            Response::Success { .. } => panic!("expected an error response"),
        }
    }

    #[test]
    fn test_parse_listed_event() {
        let json = r#"{
            "status": "success",
            "data": [{
                "id": "abc",
                "title": "Standup",
                "start": {"date_time": "2024-01-02T09:00:00Z"},
                "end": {"date_time": "2024-01-02T09:15:00Z"},
                "guests": ["a@example.com"]
            }]
        }"#;

        let response: Response<Vec<Event>> = serde_json::from_str(json).unwrap();
        let Response::Success { data } = response else {
            panic!("expected success");
        };
        assert_eq!(data[0].id, "abc");
        assert_eq!(data[0].description, "");
        assert!(!data[0].is_all_day());
    }
}
