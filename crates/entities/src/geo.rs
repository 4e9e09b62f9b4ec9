//! Geographic points and great-circle distance.

use serde::{Deserialize, Serialize};

/// Earth radius used for spherical distance, in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_378_137.0;

/// A longitude/latitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Longitude, in [-180, 180].
    pub lng: f64,
    /// Latitude, in [-90, 90].
    pub lat: f64,
}

impl GeoPoint {
    /// Creates a new point.
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Returns true if both components are finite and within range.
    pub fn is_valid(&self) -> bool {
        self.lng.is_finite()
            && self.lat.is_finite()
            && (-180.0..=180.0).contains(&self.lng)
            && (-90.0..=90.0).contains(&self.lat)
    }

    /// Great-circle distance to `other` in meters (haversine).
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lng = (other.lng - self.lng).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_METERS * c
    }

    /// Latitude span, in degrees, that covers `meters` along a meridian.
    ///
    /// Stores use this to prefilter candidates before computing exact
    /// distances.
    pub fn latitude_span(meters: f64) -> f64 {
        (meters / EARTH_RADIUS_METERS).to_degrees()
    }
}

/// Formats a distance in meters as kilometers with two decimals, e.g. `"1.25 km"`.
pub fn format_kilometers(meters: f64) -> String {
    format!("{:.2} km", meters / 1000.0)
}
