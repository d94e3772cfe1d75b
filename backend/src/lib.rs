//! # Event Calendar Backend
//!
//! Month-grid calendar with events, served over a small REST API.
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (REST API, handlers)
//!     ↓
//! Domain Layer (grid builder, event service)
//!     ↓
//! Storage Layer (in-memory event repository)
//! ```
//!
//! [`initialize_backend`] wires the services together and [`create_router`]
//! mounts the HTTP routes on top of them.

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::{Context, Result};
use axum::{
    http::{HeaderValue, Method},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::config::AppConfig;
use crate::domain::{CalendarService, EventService, GridCacheConfig};
use crate::storage::InMemoryEventRepository;

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub calendar_service: CalendarService,
    pub event_service: EventService<InMemoryEventRepository>,
}

/// Initialize the backend with all required services
pub fn initialize_backend(config: &AppConfig) -> AppState {
    info!("Setting up event storage");
    let repository = Arc::new(InMemoryEventRepository::new());

    info!(
        "Setting up domain model (grid cache enabled: {}, capacity: {})",
        config.calendar.grid_cache_enabled, config.calendar.grid_cache_capacity
    );
    let event_service = EventService::new(repository, config.calendar.max_title_length);
    let calendar_service = CalendarService::new(GridCacheConfig {
        enabled: config.calendar.grid_cache_enabled,
        capacity: config.calendar.grid_cache_capacity,
    });

    AppState {
        calendar_service,
        event_service,
    }
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, config: &AppConfig) -> Result<Router> {
    let origin = config
        .server
        .cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin: {}", config.server.cors_origin))?;

    // CORS setup to allow frontend to make requests
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let api_routes = Router::new()
        .nest("/calendar", io::rest::calendar_apis::router())
        .nest("/events", io::rest::event_apis::router());

    Ok(Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(app_state))
}
