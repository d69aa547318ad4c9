use anyhow::Result;
use axum::{
    routing::{get, post},
    Json, Router,
};
use fusion_pipeline::Pipeline;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cache;
mod routes;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub events_cache: cache::EventsCache,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "fusion_gateway=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let pipeline = Pipeline::new()?;
    tracing::info!("   Registry loaded: {} sources", pipeline.sources().len());

    let state = AppState {
        pipeline: Arc::new(pipeline),
        events_cache: cache::EventsCache::new(),
    };

    let api_routes = Router::new()
        .route("/events", get(routes::get_events))
        .route("/sources", get(routes::get_sources))
        .route("/status", get(routes::get_status))
        .route("/analyze", post(routes::analyze_event))
        .with_state(state);

    let app = Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_routes)
        .layer(CorsLayer::permissive());

    let port = std::env::var("GEOWATCH_PORT")
        .or_else(|_| std::env::var("PORT"))
        .unwrap_or_else(|_| "8700".to_string());
    let addr = format!("0.0.0.0:{}", port);

    tracing::info!("🌍 Fusion Gateway starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "fusion-gateway",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
