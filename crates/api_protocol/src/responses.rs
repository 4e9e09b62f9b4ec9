//! Response bodies that are not plain entity documents.

use serde::{Deserialize, Serialize};

use crate::Review;

/// Body of a successful register or login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Minimal reference to the location a review belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRef {
    pub name: String,
    pub id: String,
}

/// Body of `GET /api/locations/{locationid}/reviews/{reviewid}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewWithLocation {
    pub location: LocationRef,
    pub review: Review,
}

impl ReviewWithLocation {
    pub fn new(location: &entities::Location, review: &entities::Review) -> Self {
        Self {
            location: LocationRef {
                name: location.name.clone(),
                id: location.id.to_string(),
            },
            review: review.into(),
        }
    }
}

/// Body carrying only a human readable message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
