// =============================================================================
// Crosslight Backend - API Server Entry Point
// =============================================================================
// Table of Contents:
// 1. Imports
// 2. Application State
// 3. Main Entry Point
// 4. Router Setup
// =============================================================================

mod config;
mod error;
mod intersections;
mod locations;
mod signals;

use axum::{
    routing::{delete, get},
    Json, Router,
};
use crosslight_common::{spawn_staleness_sweep, IntersectionRegistry, LocationStore};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

// -----------------------------------------------------------------------------
// 2. Application State
// -----------------------------------------------------------------------------

/// Shared application state. All state lives in memory and is lost on restart.
#[derive(Clone, Default)]
pub struct AppState {
    pub locations: Arc<LocationStore>,
    pub intersections: Arc<IntersectionRegistry>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }
}

// -----------------------------------------------------------------------------
// 3. Main Entry Point
// -----------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env before the filter reads RUST_LOG
    if dotenvy::dotenv().is_err() {
        let _ = dotenvy::from_filename("crates/backend/.env");
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    let bind_addr = config.bind_address.clone();
    let sweep_config = config.sweep_config();

    let state = AppState::new();

    // Staleness sweep runs for the lifetime of the process
    let _sweep = spawn_staleness_sweep(Arc::clone(&state.locations), sweep_config);

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("🚦 Crosslight API Server running on http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

// -----------------------------------------------------------------------------
// 4. Router Setup
// -----------------------------------------------------------------------------

fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health checks
        .route("/health", get(|| async { "OK" }))
        .route("/login", get(login_probe))
        // Locations API
        .route(
            "/api/location",
            get(locations::location_probe).post(locations::report_location),
        )
        .route("/api/locations", get(locations::list_locations))
        .route("/api/locations/:id", delete(locations::delete_location))
        // Intersections API
        .route(
            "/intersections",
            get(intersections::list_intersections).post(intersections::create_intersection),
        )
        .route("/intersections/:id", delete(intersections::delete_intersection))
        // Signals API
        .route("/api/signal/:id", get(signals::get_signal))
        .route("/api/signals", get(signals::get_all_signals))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn login_probe() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "message": "Login OK - server active",
    }))
}
