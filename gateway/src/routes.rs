use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use event_core::UnifiedEvent;
use serde::Serialize;
use source_collectors::SourceConfig;

use crate::AppState;

/// Aggregated events, memoized for the cache window.
pub async fn get_events(State(state): State<AppState>) -> Json<Vec<UnifiedEvent>> {
    if let Some(cached) = state.events_cache.get().await {
        return Json(cached);
    }

    let events = state.pipeline.fetch_all_events().await;
    state.events_cache.put(events.clone()).await;
    Json(events)
}

/// The configured source registry.
pub async fn get_sources(State(state): State<AppState>) -> Json<Vec<SourceConfig>> {
    Json(state.pipeline.sources().to_vec())
}

#[derive(Serialize)]
pub struct SourceHealth {
    pub id: String,
    pub name: String,
    pub category: String,
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub overall: &'static str,
    pub timestamp: DateTime<Utc>,
    pub services: Vec<SourceHealth>,
}

/// Registry-level status summary. A source waiting on credentials counts
/// as degraded, not an outage.
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let services: Vec<SourceHealth> = state
        .pipeline
        .sources()
        .iter()
        .map(|source| SourceHealth {
            id: source.id.clone(),
            name: source.name.clone(),
            category: source.category.as_str().to_string(),
            status: if source.enabled {
                "operational"
            } else {
                "maintenance"
            },
        })
        .collect();

    let overall = if services.iter().all(|s| s.status == "operational") {
        "healthy"
    } else {
        "degraded"
    };

    Json(StatusResponse {
        overall,
        timestamp: Utc::now(),
        services,
    })
}

/// On-demand fusion analysis for a caller-supplied event.
pub async fn analyze_event(
    State(state): State<AppState>,
    Json(event): Json<UnifiedEvent>,
) -> Json<UnifiedEvent> {
    Json(state.pipeline.analyze(event).await)
}
