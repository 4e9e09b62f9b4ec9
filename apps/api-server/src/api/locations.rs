//! Location API endpoints.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use api_protocol::{
    CreateLocationRequest, OpeningTimeInput, ProximityParams, SubmittedNumber, UpdateLocationRequest,
};
use entities::{GeoPoint, Location, LocationPatch, OpeningTime, ValidationError, Violations};
use location_store::{DEFAULT_MAX_DISTANCE_METERS, LocationStore, ProximityQuery};

use super::{non_blank, path_id};
use crate::error::{ServerError, ServerResult};
use crate::state::SharedState;

const REQUIRED_FIELDS_MESSAGE: &str = "Name, longitude, latitude, and facilities are required";

/// Converts wire opening hours, requiring `days` and `closed` on each entry.
fn opening_times_from_inputs(
    inputs: Vec<OpeningTimeInput>,
) -> Result<Vec<OpeningTime>, ValidationError> {
    let mut violations = Violations::new();
    let mut opening_times = Vec::with_capacity(inputs.len());

    for (i, input) in inputs.into_iter().enumerate() {
        let days = input.days.unwrap_or_default();
        violations.require_text(format!("openingTimes[{i}].days"), &days);

        let closed = match input.closed {
            Some(closed) => closed,
            None => {
                violations.push(format!("openingTimes[{i}].closed"), "closed is required");
                false
            }
        };

        opening_times.push(OpeningTime {
            days: days.trim().to_string(),
            opening: non_blank(input.opening),
            closing: non_blank(input.closing),
            closed,
        });
    }

    violations.into_result("Location")?;
    Ok(opening_times)
}

/// Checks the coordinates of an update. A coordinate that was sent must be usable.
fn coordinate_updates(
    lng: Option<SubmittedNumber>,
    lat: Option<SubmittedNumber>,
) -> Result<(Option<f64>, Option<f64>), ValidationError> {
    let mut violations = Violations::new();
    let mut read = |field: &str, value: Option<SubmittedNumber>| match value {
        Some(SubmittedNumber::Number(n)) => Some(n),
        Some(SubmittedNumber::Unusable) => {
            violations.push(field, format!("{field} must be a number"));
            None
        }
        None => None,
    };
    let coordinates = (read("lng", lng), read("lat", lat));

    violations.into_result("Location")?;
    Ok(coordinates)
}

fn parse_number(raw: Option<String>) -> Option<f64> {
    raw.and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|n| n.is_finite())
}

/// Lists locations near a point, nearest first.
pub async fn list_locations_by_distance<S: LocationStore>(
    State(state): State<SharedState<S>>,
    query: Result<Query<ProximityParams>, QueryRejection>,
) -> ServerResult<Json<Vec<api_protocol::NearbyLocation>>> {
    let Query(params) = query?;

    let (Some(lng), Some(lat)) = (parse_number(params.lng), parse_number(params.lat)) else {
        return Err(ServerError::InvalidRequest(
            "Longitude and latitude query parameters are required".to_string(),
        ));
    };

    let origin = GeoPoint::new(lng, lat);
    if !origin.is_valid() {
        return Err(ServerError::InvalidRequest(
            "Longitude and latitude are out of range".to_string(),
        ));
    }

    let max_distance = match non_blank(params.max_distance) {
        None => DEFAULT_MAX_DISTANCE_METERS,
        Some(raw) => parse_number(Some(raw))
            .filter(|meters| *meters >= 0.0)
            .ok_or_else(|| {
                ServerError::InvalidRequest("maxDistance must be a non-negative number".to_string())
            })?,
    };

    let nearby = state
        .store
        .list_locations_near(ProximityQuery::new(origin).with_max_distance(max_distance))
        .await?;

    Ok(Json(
        nearby
            .iter()
            .map(|n| api_protocol::NearbyLocation::new(&n.location, n.distance_meters))
            .collect(),
    ))
}

/// Creates a new location.
pub async fn create_location<S: LocationStore>(
    State(state): State<SharedState<S>>,
    payload: Result<Json<CreateLocationRequest>, JsonRejection>,
) -> ServerResult<(StatusCode, Json<api_protocol::Location>)> {
    let Json(request) = payload?;
    let opening_time_inputs = request.opening_time_inputs();

    let (Some(name), Some(lng), Some(lat), Some(facilities)) = (
        non_blank(request.name),
        request.lng,
        request.lat,
        request.facilities.filter(|f| !f.is_empty()),
    ) else {
        return Err(ServerError::InvalidRequest(REQUIRED_FIELDS_MESSAGE.to_string()));
    };

    let mut location = Location::new(name, GeoPoint::new(lng, lat))
        .with_facilities(facilities)
        .with_opening_times(opening_times_from_inputs(opening_time_inputs)?);
    if let Some(address) = non_blank(request.address) {
        location = location.with_address(address);
    }

    let location = state.store.create_location(location).await?;

    tracing::info!(location_id = %location.id, name = %location.name, "Created location");

    Ok((StatusCode::CREATED, Json((&location).into())))
}

/// Gets a location with its reviews.
pub async fn read_location<S: LocationStore>(
    State(state): State<SharedState<S>>,
    Path(location_id): Path<String>,
) -> ServerResult<Json<api_protocol::Location>> {
    let location = state
        .store
        .get_location(path_id(&location_id))
        .await?
        .ok_or_else(|| ServerError::NotFound("Location not found".to_string()))?;

    Ok(Json((&location).into()))
}

/// Merges descriptive fields into a location.
pub async fn update_location<S: LocationStore>(
    State(state): State<SharedState<S>>,
    Path(location_id): Path<String>,
    payload: Result<Json<UpdateLocationRequest>, JsonRejection>,
) -> ServerResult<Json<api_protocol::Location>> {
    let Json(request) = payload?;
    let (lng, lat) = coordinate_updates(request.lng, request.lat)?;

    let patch = LocationPatch {
        name: request.name,
        address: request.address,
        facilities: request.facilities,
        lng,
        lat,
        opening_times: request
            .opening_times
            .map(opening_times_from_inputs)
            .transpose()?,
    };

    let location = state
        .store
        .update_location(path_id(&location_id), patch)
        .await?;

    tracing::info!(location_id = %location.id, "Updated location");

    Ok(Json((&location).into()))
}

/// Deletes a location and every review it owns.
pub async fn delete_location<S: LocationStore>(
    State(state): State<SharedState<S>>,
    Path(location_id): Path<String>,
) -> ServerResult<StatusCode> {
    let location_id = path_id(&location_id);
    state.store.delete_location(location_id).await?;

    tracing::info!(location_id = %location_id, "Deleted location");

    Ok(StatusCode::NO_CONTENT)
}
