//! Location entity definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{GeoPoint, Review, ValidationError, Violations, average_rating, is_valid_rating};

/// Opening hours for a range of days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningTime {
    /// Day range, e.g. "Monday - Friday".
    pub days: String,
    /// Opening time, e.g. "7:00am".
    pub opening: Option<String>,
    /// Closing time, e.g. "7:00pm".
    pub closing: Option<String>,
    /// Whether the location is closed on these days.
    pub closed: bool,
}

impl OpeningTime {
    /// Creates an entry for days on which the location is open.
    pub fn open(days: impl Into<String>, opening: impl Into<String>, closing: impl Into<String>) -> Self {
        Self {
            days: days.into(),
            opening: Some(opening.into()),
            closing: Some(closing.into()),
            closed: false,
        }
    }

    /// Creates an entry for days on which the location is closed.
    pub fn closed(days: impl Into<String>) -> Self {
        Self {
            days: days.into(),
            opening: None,
            closing: None,
            closed: true,
        }
    }
}

/// A place in the directory. Owns its reviews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Unique identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Postal address.
    pub address: Option<String>,
    /// Facility tags, e.g. "Wifi".
    pub facilities: Vec<String>,
    /// Position used for proximity search.
    pub coords: GeoPoint,
    /// Opening hours, in display order.
    pub opening_times: Vec<OpeningTime>,
    /// Mean review rating, derived from `reviews`.
    pub rating: f64,
    /// Embedded reviews, oldest first.
    pub reviews: Vec<Review>,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
    /// When this record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Location {
    /// Creates a new location with no reviews and a rating of 0.
    pub fn new(name: impl Into<String>, coords: GeoPoint) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            address: None,
            facilities: Vec::new(),
            coords,
            opening_times: Vec::new(),
            rating: 0.0,
            reviews: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the address.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Sets the facility tags.
    pub fn with_facilities(mut self, facilities: Vec<String>) -> Self {
        self.facilities = facilities;
        self
    }

    /// Sets the opening hours.
    pub fn with_opening_times(mut self, opening_times: Vec<OpeningTime>) -> Self {
        self.opening_times = opening_times;
        self
    }

    /// Finds an embedded review by ID.
    pub fn review(&self, review_id: Uuid) -> Option<&Review> {
        self.reviews.iter().find(|r| r.id == review_id)
    }

    /// Finds an embedded review by ID for modification.
    pub fn review_mut(&mut self, review_id: Uuid) -> Option<&mut Review> {
        self.reviews.iter_mut().find(|r| r.id == review_id)
    }

    /// Removes an embedded review, returning it if it existed.
    pub fn remove_review(&mut self, review_id: Uuid) -> Option<Review> {
        let index = self.reviews.iter().position(|r| r.id == review_id)?;
        Some(self.reviews.remove(index))
    }

    /// Mean rating of the current reviews.
    pub fn computed_rating(&self) -> f64 {
        average_rating(&self.reviews)
    }

    /// Checks every schema rule, including those of embedded documents.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut violations = Violations::new();

        violations.require_text("name", &self.name);
        if !self.coords.is_valid() {
            violations.push(
                "coords",
                "longitude must be in [-180, 180] and latitude in [-90, 90]",
            );
        }
        if !is_valid_rating(self.rating) {
            violations.push("rating", "must be between 0 and 5");
        }
        for (i, opening_time) in self.opening_times.iter().enumerate() {
            violations.require_text(format!("openingTimes[{i}].days"), &opening_time.days);
        }
        for (i, review) in self.reviews.iter().enumerate() {
            review.check(&format!("reviews[{i}]."), &mut violations);
        }

        violations.into_result("Location")
    }
}

/// Partial update for a location's descriptive fields.
///
/// The rating and reviews are not part of the patch: the rating is derived
/// and reviews are managed individually.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationPatch {
    pub name: Option<String>,
    pub address: Option<String>,
    pub facilities: Option<Vec<String>>,
    pub lng: Option<f64>,
    pub lat: Option<f64>,
    pub opening_times: Option<Vec<OpeningTime>>,
}

impl Location {
    /// Merges `patch` into this location and bumps `updated_at`.
    pub fn apply(&mut self, patch: LocationPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(address) = patch.address {
            self.address = Some(address);
        }
        if let Some(facilities) = patch.facilities {
            self.facilities = facilities;
        }
        if let Some(lng) = patch.lng {
            self.coords.lng = lng;
        }
        if let Some(lat) = patch.lat {
            self.coords.lat = lat;
        }
        if let Some(opening_times) = patch.opening_times {
            self.opening_times = opening_times;
        }
        self.updated_at = Utc::now();
    }
}

/// Splits comma separated facility text into trimmed, distinct tags.
pub fn parse_facilities(text: &str) -> Vec<String> {
    let mut facilities: Vec<String> = Vec::new();
    for tag in text.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if !facilities.iter().any(|f| f == tag) {
            facilities.push(tag.to_string());
        }
    }
    facilities
}
