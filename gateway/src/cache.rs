//! Single-entry TTL memo for the aggregated event list.
//!
//! Every `/api/v1/events` hit inside the window reuses the last full
//! aggregation run; the sources are slow and rate-limited, the cache is
//! not a correctness feature.

use event_core::UnifiedEvent;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

const EVENTS_TTL: Duration = Duration::from_secs(60);

struct Entry {
    events: Vec<UnifiedEvent>,
    expires_at: Instant,
}

#[derive(Clone)]
pub struct EventsCache {
    entry: Arc<RwLock<Option<Entry>>>,
    ttl: Duration,
}

impl EventsCache {
    pub fn new() -> Self {
        Self::with_ttl(EVENTS_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entry: Arc::new(RwLock::new(None)),
            ttl,
        }
    }

    pub async fn get(&self) -> Option<Vec<UnifiedEvent>> {
        let entry = self.entry.read().await;
        entry
            .as_ref()
            .filter(|e| e.expires_at > Instant::now())
            .map(|e| e.events.clone())
    }

    pub async fn put(&self, events: Vec<UnifiedEvent>) {
        let mut entry = self.entry.write().await;
        *entry = Some(Entry {
            events,
            expires_at: Instant::now() + self.ttl,
        });
    }
}

impl Default for EventsCache {
    fn default() -> Self {
        Self::new()
    }
}
