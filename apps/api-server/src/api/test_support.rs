//! Helpers for driving the full router in tests.

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use async_trait::async_trait;
use entities::{Location, LocationPatch, Review, ReviewPatch, User};
use location_store::{
    LocationStore, MemoryLocationStore, NearbyLocation, ProximityQuery, StoreError, StoreResult,
};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use crate::config::Config;
use crate::state::SharedState;
use crate::{create_app, create_state};

pub(crate) fn test_config(extra: &[(&str, &str)]) -> Config {
    Config::from_lookup(|key| match key {
        "JWT_SECRET" => Some("test-secret".to_string()),
        "DATABASE_URL" => Some("memory".to_string()),
        _ => extra
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string()),
    })
    .unwrap()
}

pub(crate) fn test_app_with(config: Config) -> (Router, SharedState<MemoryLocationStore>) {
    let state = create_state(config, MemoryLocationStore::new()).unwrap();
    (create_app(state.clone()), state)
}

pub(crate) fn test_app() -> (Router, SharedState<MemoryLocationStore>) {
    test_app_with(test_config(&[]))
}

/// Memory store whose rating writes always fail.
#[derive(Clone, Default)]
pub(crate) struct RatingWriteFails(pub MemoryLocationStore);

#[async_trait]
impl LocationStore for RatingWriteFails {
    async fn create_location(&self, location: Location) -> StoreResult<Location> {
        self.0.create_location(location).await
    }

    async fn get_location(&self, id: Uuid) -> StoreResult<Option<Location>> {
        self.0.get_location(id).await
    }

    async fn list_locations_near(&self, query: ProximityQuery) -> StoreResult<Vec<NearbyLocation>> {
        self.0.list_locations_near(query).await
    }

    async fn update_location(&self, id: Uuid, patch: LocationPatch) -> StoreResult<Location> {
        self.0.update_location(id, patch).await
    }

    async fn delete_location(&self, id: Uuid) -> StoreResult<()> {
        self.0.delete_location(id).await
    }

    async fn set_location_rating(&self, _id: Uuid, _rating: f64) -> StoreResult<()> {
        Err(StoreError::Other("rating column is read-only".to_string()))
    }

    async fn add_review(&self, location_id: Uuid, review: Review) -> StoreResult<Review> {
        self.0.add_review(location_id, review).await
    }

    async fn update_review(
        &self,
        location_id: Uuid,
        review_id: Uuid,
        patch: ReviewPatch,
    ) -> StoreResult<Review> {
        self.0.update_review(location_id, review_id, patch).await
    }

    async fn delete_review(&self, location_id: Uuid, review_id: Uuid) -> StoreResult<()> {
        self.0.delete_review(location_id, review_id).await
    }

    async fn create_user(&self, user: User) -> StoreResult<User> {
        self.0.create_user(user).await
    }

    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.0.get_user_by_email(email).await
    }
}

pub(crate) fn test_app_with_failing_ratings() -> Router {
    let state = create_state(test_config(&[]), RatingWriteFails::default()).unwrap();
    create_app(state)
}

/// Sends a JSON request and returns the status with the decoded body
/// (`Value::Null` when the body is empty).
pub(crate) async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

/// Sends a bodiless request and returns the raw body text.
pub(crate) async fn send_raw(app: &Router, method: Method, uri: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

/// Registers a user and returns their token.
pub(crate) async fn register_user(app: &Router, name: &str, email: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/register",
        None,
        Some(json!({ "name": name, "email": email, "password": "hunter22" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register failed: {body}");
    body["token"].as_str().unwrap().to_string()
}

/// Creates a location through the API and returns its id.
pub(crate) async fn seed_location(app: &Router, name: &str, lng: f64, lat: f64) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/locations",
        None,
        Some(json!({ "name": name, "lng": lng, "lat": lat, "facilities": "Wifi" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
    body["_id"].as_str().unwrap().to_string()
}
