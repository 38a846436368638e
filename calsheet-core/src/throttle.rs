//! Pacing of mutating calls to an event store.
//!
//! Calendar APIs reject bursts of writes past an undocumented ceiling. The
//! writer lets the first `burst` mutations of a pass through untouched and
//! sleeps `delay` after each one beyond that. This is backpressure, not a
//! guaranteed rate limit.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SyncResult;
use crate::event::{Event, EventDraft, EventTiming};
use crate::store::EventStore;

/// Tunable pacing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottlePolicy {
    /// Mutations allowed before pacing starts.
    pub burst: u32,
    /// Pause after each mutation past the burst.
    #[serde(rename = "delay_ms", with = "millis")]
    pub delay: Duration,
}

impl Default for ThrottlePolicy {
    fn default() -> Self {
        ThrottlePolicy {
            burst: 10,
            delay: Duration::from_millis(75),
        }
    }
}

impl ThrottlePolicy {
    pub fn unthrottled() -> Self {
        ThrottlePolicy {
            burst: u32::MAX,
            delay: Duration::ZERO,
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// Wraps an [`EventStore`] for the duration of one pass.
pub struct ThrottledWriter<'a, E> {
    store: &'a E,
    policy: ThrottlePolicy,
    mutations: u32,
}

impl<'a, E: EventStore> ThrottledWriter<'a, E> {
    pub fn new(store: &'a E, policy: ThrottlePolicy) -> Self {
        ThrottledWriter {
            store,
            policy,
            mutations: 0,
        }
    }

    /// Mutating calls issued so far in this pass.
    pub fn mutations(&self) -> u32 {
        self.mutations
    }

    pub fn store(&self) -> &E {
        self.store
    }

    pub async fn create(&mut self, draft: &EventDraft, timing: &EventTiming) -> SyncResult<Event> {
        let created = match timing {
            EventTiming::Timed { start, end } => {
                self.store.create_event(draft, *start, *end).await?
            }
            EventTiming::AllDay {
                first_day,
                last_day,
            } => {
                self.store
                    .create_all_day_event(draft, *first_day, *last_day)
                    .await?
            }
        };
        self.pace().await;
        Ok(created)
    }

    pub async fn update(
        &mut self,
        id: &str,
        draft: &EventDraft,
        timing: &EventTiming,
    ) -> SyncResult<Event> {
        let updated = self.store.update_event(id, draft, timing).await?;
        self.pace().await;
        Ok(updated)
    }

    pub async fn delete(&mut self, id: &str) -> SyncResult<()> {
        self.store.delete_event(id).await?;
        self.pace().await;
        Ok(())
    }

    async fn pace(&mut self) {
        self.mutations = self.mutations.saturating_add(1);
        if self.mutations > self.policy.burst && !self.policy.delay.is_zero() {
            debug!(mutations = self.mutations, delay = ?self.policy.delay, "pacing calendar writes");
            tokio::time::sleep(self.policy.delay).await;
        }
    }
}
