//! API endpoints.

pub mod auth;
pub mod locations;
pub mod reviews;

#[cfg(test)]
pub(crate) mod test_support;

use axum::{
    Json, Router,
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{get, post, put},
};
use location_store::LocationStore;
use serde_json::json;
use uuid::Uuid;

use crate::middleware::auth_middleware;
use crate::state::SharedState;

/// Creates the API router with all endpoints.
///
/// Review mutations sit behind `auth_middleware`; everything else is public.
pub fn create_router<S: LocationStore + 'static>(state: SharedState<S>) -> Router<SharedState<S>> {
    let require_auth = from_fn_with_state(state, auth_middleware::<S>);

    Router::new()
        // Location endpoints
        .route(
            "/api/locations",
            get(locations::list_locations_by_distance::<S>).post(locations::create_location::<S>),
        )
        .route(
            "/api/locations/:locationid",
            get(locations::read_location::<S>)
                .put(locations::update_location::<S>)
                .delete(locations::delete_location::<S>),
        )
        // Review endpoints
        .route(
            "/api/locations/:locationid/reviews",
            post(reviews::create_review::<S>).route_layer(require_auth.clone()),
        )
        .route(
            "/api/locations/:locationid/reviews/:reviewid",
            put(reviews::update_review::<S>)
                .delete(reviews::delete_review::<S>)
                .route_layer(require_auth)
                .get(reviews::read_review::<S>),
        )
        // Auth endpoints
        .route("/api/register", post(auth::register::<S>))
        .route("/api/login", post(auth::login::<S>))
        // Health check
        .route("/health", get(health_check))
        .fallback(endpoint_not_found)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

async fn endpoint_not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "Endpoint not found" })),
    )
}

/// Reads a document id from a path segment.
///
/// Text that is not a UUID cannot name a stored document, so it maps to the
/// nil id and surfaces as the store's ordinary not-found.
pub(crate) fn path_id(raw: &str) -> Uuid {
    raw.parse().unwrap_or(Uuid::nil())
}

/// Trims `value` and drops it if nothing is left.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
