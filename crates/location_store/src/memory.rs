//! In-memory store implementation.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use entities::{Location, LocationPatch, Review, ReviewPatch, User, is_valid_rating};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{LocationStore, NearbyLocation, ProximityQuery, StoreError, StoreResult};

/// In-memory store for tests and ephemeral deployments.
///
/// Each mutation holds the write lock for its whole read-modify-write, which
/// makes every write atomic per location.
#[derive(Debug, Default, Clone)]
pub struct MemoryLocationStore {
    locations: Arc<RwLock<HashMap<Uuid, Location>>>,
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl MemoryLocationStore {
    /// Creates a new in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Looks up a location for modification.
fn location_mut(
    locations: &mut HashMap<Uuid, Location>,
    id: Uuid,
) -> StoreResult<&mut Location> {
    locations
        .get_mut(&id)
        .ok_or_else(|| StoreError::not_found("Location", id.to_string()))
}

#[async_trait]
impl LocationStore for MemoryLocationStore {
    // =========================================================================
    // Location operations
    // =========================================================================

    async fn create_location(&self, location: Location) -> StoreResult<Location> {
        location.validate()?;

        let mut locations = self.locations.write().await;
        if locations.contains_key(&location.id) {
            return Err(StoreError::already_exists(
                "Location",
                location.id.to_string(),
            ));
        }
        locations.insert(location.id, location.clone());
        Ok(location)
    }

    async fn get_location(&self, id: Uuid) -> StoreResult<Option<Location>> {
        let locations = self.locations.read().await;
        Ok(locations.get(&id).cloned())
    }

    async fn list_locations_near(
        &self,
        query: ProximityQuery,
    ) -> StoreResult<Vec<NearbyLocation>> {
        let locations = self.locations.read().await;
        Ok(query.rank(locations.values().cloned()))
    }

    async fn update_location(&self, id: Uuid, patch: LocationPatch) -> StoreResult<Location> {
        let mut locations = self.locations.write().await;
        let stored = location_mut(&mut locations, id)?;

        let mut updated = stored.clone();
        updated.apply(patch);
        updated.validate()?;

        *stored = updated.clone();
        Ok(updated)
    }

    async fn delete_location(&self, id: Uuid) -> StoreResult<()> {
        let mut locations = self.locations.write().await;
        if locations.remove(&id).is_none() {
            return Err(StoreError::not_found("Location", id.to_string()));
        }
        Ok(())
    }

    async fn set_location_rating(&self, id: Uuid, rating: f64) -> StoreResult<()> {
        if !is_valid_rating(rating) {
            return Err(StoreError::Other(format!("rating out of range: {rating}")));
        }

        let mut locations = self.locations.write().await;
        let stored = location_mut(&mut locations, id)?;
        stored.rating = rating;
        Ok(())
    }

    // =========================================================================
    // Review operations
    // =========================================================================

    async fn add_review(&self, location_id: Uuid, review: Review) -> StoreResult<Review> {
        review.validate()?;

        let mut locations = self.locations.write().await;
        let stored = location_mut(&mut locations, location_id)?;
        stored.reviews.push(review.clone());
        stored.updated_at = chrono::Utc::now();
        Ok(review)
    }

    async fn update_review(
        &self,
        location_id: Uuid,
        review_id: Uuid,
        patch: ReviewPatch,
    ) -> StoreResult<Review> {
        let mut locations = self.locations.write().await;
        let stored = location_mut(&mut locations, location_id)?;

        let mut review = stored
            .review(review_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Review", review_id.to_string()))?;
        review.apply(patch);
        review.validate()?;

        if let Some(slot) = stored.review_mut(review_id) {
            *slot = review.clone();
        }
        stored.updated_at = chrono::Utc::now();
        Ok(review)
    }

    async fn delete_review(&self, location_id: Uuid, review_id: Uuid) -> StoreResult<()> {
        let mut locations = self.locations.write().await;
        let stored = location_mut(&mut locations, location_id)?;

        if stored.remove_review(review_id).is_none() {
            return Err(StoreError::not_found("Review", review_id.to_string()));
        }
        stored.updated_at = chrono::Utc::now();
        Ok(())
    }

    // =========================================================================
    // User operations
    // =========================================================================

    async fn create_user(&self, user: User) -> StoreResult<User> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.id) || users.values().any(|u| u.email == user.email) {
            return Err(StoreError::already_exists("User", user.email.clone()));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }
}

#[cfg(test)]
mod tests {
    use entities::{GeoPoint, OpeningTime};

    use super::*;

    fn cafe(name: &str, lng: f64, lat: f64) -> Location {
        Location::new(name, GeoPoint::new(lng, lat))
            .with_facilities(vec!["Wifi".to_string(), "Coffee".to_string()])
    }

    #[tokio::test]
    async fn test_location_crud() {
        let store = MemoryLocationStore::new();

        // Create
        let created = store
            .create_location(cafe("Cafe X", -0.1, 51.5))
            .await
            .unwrap();
        assert_eq!(created.name, "Cafe X");

        // Get
        let fetched = store.get_location(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.coords, GeoPoint::new(-0.1, 51.5));
        assert_eq!(fetched.facilities, vec!["Wifi", "Coffee"]);

        // Update
        let updated = store
            .update_location(
                created.id,
                LocationPatch {
                    address: Some("1 High Street".to_string()),
                    opening_times: Some(vec![OpeningTime::closed("Sunday")]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.address.as_deref(), Some("1 High Street"));
        assert_eq!(updated.name, "Cafe X");

        // Delete
        store.delete_location(created.id).await.unwrap();
        assert!(store.get_location(created.id).await.unwrap().is_none());
        assert!(matches!(
            store.delete_location(created.id).await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_location_is_not_written() {
        let store = MemoryLocationStore::new();
        let result = store
            .create_location(Location::new("", GeoPoint::new(0.0, 0.0)))
            .await;
        assert!(matches!(result, Err(StoreError::Validation(_))));

        let created = store.create_location(cafe("Ok", 0.0, 0.0)).await.unwrap();
        let result = store
            .update_location(
                created.id,
                LocationPatch {
                    lat: Some(123.0),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(StoreError::Validation(_))));

        let stored = store.get_location(created.id).await.unwrap().unwrap();
        assert_eq!(stored.coords.lat, 0.0);
    }

    #[tokio::test]
    async fn test_list_locations_near() {
        let store = MemoryLocationStore::new();
        store.create_location(cafe("Far", 0.0, 2.0)).await.unwrap();
        store.create_location(cafe("Near", 0.0, 0.1)).await.unwrap();
        store.create_location(cafe("Very far", 50.0, 50.0)).await.unwrap();

        let nearby = store
            .list_locations_near(ProximityQuery::new(GeoPoint::new(0.0, 0.0)))
            .await
            .unwrap();

        let names: Vec<_> = nearby.iter().map(|n| n.location.name.as_str()).collect();
        assert_eq!(names, vec!["Near", "Far"]);
    }

    #[tokio::test]
    async fn test_review_lifecycle() {
        let store = MemoryLocationStore::new();
        let location = store.create_location(cafe("Cafe", 0.0, 0.0)).await.unwrap();

        let review = store
            .add_review(location.id, Review::new("Ann", 4.0, "Good"))
            .await
            .unwrap();

        let updated = store
            .update_review(
                location.id,
                review.id,
                ReviewPatch {
                    rating: Some(2.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.rating, 2.0);
        assert_eq!(updated.author, "Ann");
        assert_eq!(updated.review_text, "Good");

        store.delete_review(location.id, review.id).await.unwrap();
        let stored = store.get_location(location.id).await.unwrap().unwrap();
        assert!(stored.reviews.is_empty());

        assert!(matches!(
            store.delete_review(location.id, review.id).await,
            Err(StoreError::NotFound { entity_type: "Review", .. })
        ));
        assert!(matches!(
            store
                .add_review(Uuid::new_v4(), Review::new("Ann", 4.0, "Good"))
                .await,
            Err(StoreError::NotFound { entity_type: "Location", .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_review_patch_is_rejected() {
        let store = MemoryLocationStore::new();
        let location = store.create_location(cafe("Cafe", 0.0, 0.0)).await.unwrap();
        let review = store
            .add_review(location.id, Review::new("Ann", 4.0, "Good"))
            .await
            .unwrap();

        let result = store
            .update_review(
                location.id,
                review.id,
                ReviewPatch {
                    rating: Some(7.0),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(StoreError::Validation(_))));

        let stored = store.get_location(location.id).await.unwrap().unwrap();
        assert_eq!(stored.review(review.id).unwrap().rating, 4.0);
    }

    #[tokio::test]
    async fn test_set_location_rating() {
        let store = MemoryLocationStore::new();
        let location = store.create_location(cafe("Cafe", 0.0, 0.0)).await.unwrap();

        store.set_location_rating(location.id, 4.5).await.unwrap();
        let stored = store.get_location(location.id).await.unwrap().unwrap();
        assert_eq!(stored.rating, 4.5);

        assert!(store.set_location_rating(location.id, 6.0).await.is_err());
    }

    #[tokio::test]
    async fn test_user_email_is_unique() {
        let store = MemoryLocationStore::new();
        let user = store
            .create_user(User::new("a@example.com", "Ann", "hash", "salt"))
            .await
            .unwrap();

        let duplicate = store
            .create_user(User::new("a@example.com", "Other", "hash", "salt"))
            .await;
        assert!(matches!(duplicate, Err(StoreError::AlreadyExists { .. })));

        let by_email = store.get_user_by_email("a@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
        assert_eq!(by_email.name, "Ann");
        assert!(store.get_user_by_email("b@example.com").await.unwrap().is_none());
    }

    #[test]
    fn test_clones_share_state() {
        let store = MemoryLocationStore::new();
        let handle = store.clone();

        let created = tokio_test::block_on(store.create_location(cafe("Cafe", 0.0, 0.0))).unwrap();
        let seen = tokio_test::block_on(handle.get_location(created.id)).unwrap();

        assert_eq!(seen.map(|l| l.name), Some("Cafe".to_string()));
    }
}
