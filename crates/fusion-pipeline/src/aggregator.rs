//! Concurrent collector fan-out with per-source isolation.

use event_core::UnifiedEvent;
use source_collectors::Collector;
use tracing::warn;

/// Run every collector in its own task and union the successes.
///
/// Isolation is the contract: a collector that fails or panics loses only
/// its own events. Each outcome is logged per source.
pub async fn fetch_from_collectors(collectors: Vec<Box<dyn Collector>>) -> Vec<UnifiedEvent> {
    let handles: Vec<_> = collectors
        .into_iter()
        .map(|collector| {
            tokio::spawn(async move {
                let id = collector.source().id.clone();
                (id, collector.fetch().await)
            })
        })
        .collect();

    let mut events = Vec::new();
    for handle in handles {
        match handle.await {
            Ok((id, result)) => {
                if let Some(error) = result.error {
                    warn!(source = %id, "collector failed: {error}");
                }
                events.extend(result.events);
            }
            Err(e) => {
                warn!("collector task panicked: {e}");
            }
        }
    }
    events
}

/// Newest first. Stable, so same-timestamp events keep collector order.
pub fn sort_events_desc(events: &mut [UnifiedEvent]) {
    events.sort_by(|a, b| b.time.cmp(&a.time));
}
