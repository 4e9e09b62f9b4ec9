//! Loc8r API Server
//!
//! REST API over a directory of locations and their reviews. Review mutations
//! require a bearer token obtained from `/api/register` or `/api/login`.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;

use auth::{JwtConfig, JwtManager};
use axum::Router;
use location_store::LocationStore;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::error_detail_middleware;
use crate::state::{SharedState, create_shared_state};

/// Creates the application router with all routes configured.
pub fn create_app<S: LocationStore + 'static>(state: SharedState<S>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = api::create_router(state.clone()).with_state(state.clone());
    if state.config.is_development() {
        app = app.layer(axum::middleware::from_fn(error_detail_middleware));
    }

    app.layer(TraceLayer::new_for_http()).layer(cors)
}

/// Creates the application state with the given configuration and store.
pub fn create_state<S: LocationStore>(config: Config, store: S) -> anyhow::Result<SharedState<S>> {
    let jwt_config = JwtConfig::new(config.jwt_secret.clone())
        .with_expiration_hours(config.jwt_expiration_hours);
    let jwt_manager = JwtManager::new(jwt_config)?;

    Ok(create_shared_state(config, store, jwt_manager))
}

/// Initializes tracing with the given log level.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
