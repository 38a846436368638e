pub mod protocol;
pub mod provider;

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::date_range::DateRange;
use crate::error::{SyncError, SyncResult};
use crate::event::{Event, EventDraft, EventTiming};
use crate::remote::protocol::{CreateEvent, DeleteEvent, ListEvents, UpdateEvent};
use crate::remote::provider::Provider;
use crate::store::EventStore;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct RemoteConfig(pub HashMap<String, toml::Value>);

impl From<&RemoteConfig> for serde_json::Map<String, serde_json::Value> {
    fn from(config: &RemoteConfig) -> Self {
        config
            .0
            .iter()
            .filter_map(|(k, v)| serde_json::to_value(v).ok().map(|v| (k.clone(), v)))
            .collect()
    }
}

/// A calendar reached through a provider binary.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Remote {
    pub provider: Provider,
    #[serde(flatten)]
    pub config: RemoteConfig,
}

impl Remote {
    fn remote_config(&self) -> serde_json::Map<String, serde_json::Value> {
        serde_json::Map::from(&self.config)
    }

    pub fn new(provider: Provider, config: RemoteConfig) -> Self {
        Remote { provider, config }
    }

    /// Fails with a configuration error when the provider binary is missing.
    pub fn ensure_available(&self) -> SyncResult<()> {
        self.provider.binary_path().map(|_| ()).map_err(|e| {
            SyncError::Configuration(format!(
                "{e}. Install {} or fix [remote] in config.toml",
                self.provider.binary_name()
            ))
        })
    }
}

/// Mutation failures become capability errors; transport failures pass through.
fn capability(err: SyncError) -> SyncError {
    match err {
        SyncError::Provider(msg) => SyncError::Capability(msg),
        other => other,
    }
}

impl EventStore for Remote {
    async fn list_events(&self, range: &DateRange) -> SyncResult<Vec<Event>> {
        self.provider
            .call(ListEvents {
                remote_config: self.remote_config(),
                from: range.from_rfc3339(),
                to: range.to_rfc3339(),
            })
            .await
    }

    async fn create_event(
        &self,
        draft: &EventDraft,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> SyncResult<Event> {
        self.provider
            .call(CreateEvent {
                remote_config: self.remote_config(),
                event: draft.clone(),
                timing: EventTiming::Timed { start, end },
            })
            .await
            .map_err(capability)
    }

    async fn create_all_day_event(
        &self,
        draft: &EventDraft,
        first_day: NaiveDate,
        last_day: NaiveDate,
    ) -> SyncResult<Event> {
        self.provider
            .call(CreateEvent {
                remote_config: self.remote_config(),
                event: draft.clone(),
                timing: EventTiming::AllDay {
                    first_day,
                    last_day,
                },
            })
            .await
            .map_err(capability)
    }

    async fn delete_event(&self, id: &str) -> SyncResult<()> {
        self.provider
            .call(DeleteEvent {
                remote_config: self.remote_config(),
                event_id: id.to_string(),
            })
            .await
            .map_err(capability)
    }

    fn supports_update(&self) -> bool {
        true
    }

    async fn update_event(
        &self,
        id: &str,
        draft: &EventDraft,
        timing: &EventTiming,
    ) -> SyncResult<Event> {
        self.provider
            .call(UpdateEvent {
                remote_config: self.remote_config(),
                event_id: id.to_string(),
                event: draft.clone(),
                timing: timing.clone(),
            })
            .await
            .map_err(capability)
    }
}
