//! Shared wire types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// GeoJSON point, `coordinates` is `[longitude, latitude]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoJsonPoint {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: [f64; 2],
}

impl From<entities::GeoPoint> for GeoJsonPoint {
    fn from(point: entities::GeoPoint) -> Self {
        Self {
            kind: "Point".to_string(),
            coordinates: [point.lng, point.lat],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpeningTime {
    pub days: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closing: Option<String>,
    pub closed: bool,
}

impl From<&entities::OpeningTime> for OpeningTime {
    fn from(opening_time: &entities::OpeningTime) -> Self {
        Self {
            days: opening_time.days.clone(),
            opening: opening_time.opening.clone(),
            closing: opening_time.closing.clone(),
            closed: opening_time.closed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: String,
    pub author: String,
    pub rating: f64,
    pub review_text: String,
    pub created_on: DateTime<Utc>,
}

impl From<&entities::Review> for Review {
    fn from(review: &entities::Review) -> Self {
        Self {
            id: review.id.to_string(),
            author: review.author.clone(),
            rating: review.rating,
            review_text: review.review_text.clone(),
            created_on: review.created_on,
        }
    }
}

/// A full location document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub rating: f64,
    pub facilities: Vec<String>,
    pub coords: GeoJsonPoint,
    pub opening_times: Vec<OpeningTime>,
    pub reviews: Vec<Review>,
}

impl From<&entities::Location> for Location {
    fn from(location: &entities::Location) -> Self {
        Self {
            id: location.id.to_string(),
            name: location.name.clone(),
            address: location.address.clone(),
            rating: location.rating,
            facilities: location.facilities.clone(),
            coords: location.coords.into(),
            opening_times: location.opening_times.iter().map(OpeningTime::from).collect(),
            reviews: location.reviews.iter().map(Review::from).collect(),
        }
    }
}

/// Summary of a location returned by proximity search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyLocation {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub rating: f64,
    pub facilities: Vec<String>,
    /// Distance from the query point, e.g. `"1.25 km"`.
    pub distance: String,
}

impl NearbyLocation {
    /// Builds the summary of `location` at `distance_meters` from the query point.
    pub fn new(location: &entities::Location, distance_meters: f64) -> Self {
        Self {
            id: location.id.to_string(),
            name: location.name.clone(),
            address: location.address.clone(),
            rating: location.rating,
            facilities: location.facilities.clone(),
            distance: entities::format_kilometers(distance_meters),
        }
    }
}
