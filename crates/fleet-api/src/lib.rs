//! # Fleet Tracker API
//!
//! REST surface over the fleet telemetry core.
//!
//! ## Endpoints
//!
//! - `POST /api/vehicle/ingest`: store a status update, derive a trip
//! - `GET /api/vehicle/status?vehicle_id=`: latest status, cache first
//! - `GET /api/vehicle/trips?vehicle_id=[&since=]`: trips, newest first
//! - `GET /api/vehicles`: every known vehicle id
//! - `GET /health`
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Axum HTTP Server                         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │               ┌───────────────┐
//!                              ▼               │   Simulator   │
//! ┌─────────────────────────────────────────┐  │ (background)  │
//! │        ApiContext / FleetService        │◀─┴───────────────┘
//! └─────────────────────────────────────────┘
//!                    │                   │
//!                    ▼                   ▼
//! ┌─────────────────────────┐   ┌──────────────────────────────┐
//! │     Redis Cache         │   │        ScyllaDB              │
//! │  (latest status, 5 min) │   │   (Source of Truth)          │
//! └─────────────────────────┘   └──────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod context;
pub mod error;
pub mod routes;

use axum::{
    Router,
    http::Method,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use context::ApiContext;
pub use error::{ApiError, ApiResult};

/// Build the Axum router
pub fn build_router(ctx: ApiContext) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_origin(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/vehicle/ingest", post(routes::ingest))
        .route("/api/vehicle/status", get(routes::status))
        .route("/api/vehicle/trips", get(routes::trips))
        .route("/api/vehicles", get(routes::vehicles))
        // Health check
        .route("/health", get(routes::health_check))
        .route("/", get(|| async { "Fleet Tracker API" }))
        // State and middleware
        .with_state(ctx)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
