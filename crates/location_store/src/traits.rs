//! Store trait definitions.

use async_trait::async_trait;
use entities::{GeoPoint, Location, LocationPatch, Review, ReviewPatch, User};
use uuid::Uuid;

use crate::StoreResult;

/// Search radius used when a proximity query does not give one, in meters.
pub const DEFAULT_MAX_DISTANCE_METERS: f64 = 300_000.0;

/// Parameters for a proximity search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityQuery {
    /// Point to measure distances from.
    pub origin: GeoPoint,
    /// Inclusive search radius in meters.
    pub max_distance_meters: f64,
}

impl ProximityQuery {
    /// Creates a query with the default radius.
    pub fn new(origin: GeoPoint) -> Self {
        Self {
            origin,
            max_distance_meters: DEFAULT_MAX_DISTANCE_METERS,
        }
    }

    /// Sets the search radius.
    pub fn with_max_distance(mut self, meters: f64) -> Self {
        self.max_distance_meters = meters;
        self
    }

    /// Keeps the candidates within range, nearest first.
    ///
    /// Equal distances are ordered by creation time.
    pub fn rank(&self, candidates: impl IntoIterator<Item = Location>) -> Vec<NearbyLocation> {
        let mut nearby: Vec<NearbyLocation> = candidates
            .into_iter()
            .filter_map(|location| {
                let distance_meters = self.origin.distance_to(&location.coords);
                (distance_meters <= self.max_distance_meters).then_some(NearbyLocation {
                    location,
                    distance_meters,
                })
            })
            .collect();

        nearby.sort_by(|a, b| {
            a.distance_meters
                .total_cmp(&b.distance_meters)
                .then_with(|| a.location.created_at.cmp(&b.location.created_at))
        });

        nearby
    }
}

/// A location returned by a proximity search.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyLocation {
    /// The matching location.
    pub location: Location,
    /// Distance from the query origin, in meters.
    pub distance_meters: f64,
}

/// Trait for location and user storage operations.
///
/// Every write is atomic per location document. Implementations validate the
/// resulting document before persisting it.
#[async_trait]
pub trait LocationStore: Send + Sync {
    // =========================================================================
    // Location operations
    // =========================================================================

    /// Creates a new location.
    async fn create_location(&self, location: Location) -> StoreResult<Location>;

    /// Gets a location by ID.
    async fn get_location(&self, id: Uuid) -> StoreResult<Option<Location>>;

    /// Lists locations within the query radius, nearest first.
    async fn list_locations_near(&self, query: ProximityQuery)
        -> StoreResult<Vec<NearbyLocation>>;

    /// Merges a patch into a location.
    async fn update_location(&self, id: Uuid, patch: LocationPatch) -> StoreResult<Location>;

    /// Deletes a location together with its reviews.
    async fn delete_location(&self, id: Uuid) -> StoreResult<()>;

    /// Overwrites the stored rating aggregate of a location.
    async fn set_location_rating(&self, id: Uuid, rating: f64) -> StoreResult<()>;

    // =========================================================================
    // Review operations
    // =========================================================================

    /// Appends a review to a location.
    async fn add_review(&self, location_id: Uuid, review: Review) -> StoreResult<Review>;

    /// Applies a patch to one review of a location.
    async fn update_review(
        &self,
        location_id: Uuid,
        review_id: Uuid,
        patch: ReviewPatch,
    ) -> StoreResult<Review>;

    /// Removes one review from a location.
    async fn delete_review(&self, location_id: Uuid, review_id: Uuid) -> StoreResult<()>;

    // =========================================================================
    // User operations
    // =========================================================================

    /// Creates a new user. Fails if the email is already registered.
    async fn create_user(&self, user: User) -> StoreResult<User>;

    /// Gets a user by email.
    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_filters_and_sorts() {
        let origin = GeoPoint::new(0.0, 0.0);
        let far = Location::new("Far", GeoPoint::new(0.0, 2.0));
        let near = Location::new("Near", GeoPoint::new(0.0, 0.5));
        let out_of_range = Location::new("Out", GeoPoint::new(0.0, 10.0));

        let query = ProximityQuery::new(origin);
        let ranked = query.rank(vec![far, out_of_range, near]);

        let names: Vec<_> = ranked.iter().map(|n| n.location.name.as_str()).collect();
        assert_eq!(names, vec!["Near", "Far"]);
        assert!(ranked[0].distance_meters <= ranked[1].distance_meters);
    }

    #[test]
    fn test_rank_radius_is_inclusive() {
        let origin = GeoPoint::new(0.0, 0.0);
        let location = Location::new("Edge", GeoPoint::new(0.0, 1.0));
        let exact = origin.distance_to(&location.coords);

        let ranked = ProximityQuery::new(origin)
            .with_max_distance(exact)
            .rank(vec![location]);
        assert_eq!(ranked.len(), 1);
    }

    #[test]
    fn test_default_radius() {
        let query = ProximityQuery::new(GeoPoint::new(1.0, 2.0));
        assert_eq!(query.max_distance_meters, 300_000.0);
    }
}
