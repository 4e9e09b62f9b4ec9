//! Rating aggregate maintenance.
//!
//! The aggregate is refreshed after each review mutation by re-reading the
//! location, so it reflects the reviews present at refresh time. The refresh is
//! not atomic with the mutation: a failure is logged and the triggering request
//! still succeeds.

use location_store::{LocationStore, StoreResult};
use uuid::Uuid;

/// Recomputes and stores the rating of `location_id`.
///
/// Returns the new rating, or `None` if the location vanished or the refresh
/// failed.
pub async fn refresh_location_rating<S: LocationStore>(store: &S, location_id: Uuid) -> Option<f64> {
    match try_refresh(store, location_id).await {
        Ok(Some(rating)) => {
            tracing::info!(location_id = %location_id, rating, "Average rating updated");
            Some(rating)
        }
        Ok(None) => {
            tracing::warn!(location_id = %location_id, "Location removed before rating refresh");
            None
        }
        Err(e) => {
            tracing::warn!(location_id = %location_id, error = %e, "Failed to refresh average rating");
            None
        }
    }
}

async fn try_refresh<S: LocationStore>(store: &S, location_id: Uuid) -> StoreResult<Option<f64>> {
    let Some(location) = store.get_location(location_id).await? else {
        return Ok(None);
    };

    let rating = location.computed_rating();
    store.set_location_rating(location_id, rating).await?;

    Ok(Some(rating))
}

#[cfg(test)]
mod tests {
    use entities::{GeoPoint, Location, Review};
    use location_store::MemoryLocationStore;

    use super::*;
    use crate::api::test_support::RatingWriteFails;

    #[tokio::test]
    async fn test_refresh_averages_reviews() {
        let store = MemoryLocationStore::new();
        let location = store
            .create_location(Location::new("Cafe", GeoPoint::new(0.0, 0.0)))
            .await
            .unwrap();
        store
            .add_review(location.id, Review::new("Ann", 4.0, "Good"))
            .await
            .unwrap();
        store
            .add_review(location.id, Review::new("Bob", 5.0, "Great"))
            .await
            .unwrap();

        assert_eq!(refresh_location_rating(&store, location.id).await, Some(4.5));

        let stored = store.get_location(location.id).await.unwrap().unwrap();
        assert_eq!(stored.rating, 4.5);
    }

    #[tokio::test]
    async fn test_refresh_without_reviews_is_zero() {
        let store = MemoryLocationStore::new();
        let location = store
            .create_location(Location::new("Cafe", GeoPoint::new(0.0, 0.0)))
            .await
            .unwrap();

        assert_eq!(refresh_location_rating(&store, location.id).await, Some(0.0));
    }

    #[tokio::test]
    async fn test_refresh_missing_location() {
        let store = MemoryLocationStore::new();
        assert_eq!(refresh_location_rating(&store, Uuid::new_v4()).await, None);
    }

    #[tokio::test]
    async fn test_refresh_store_failure_is_swallowed() {
        let store = RatingWriteFails::default();
        let location = store
            .create_location(Location::new("Cafe", GeoPoint::new(0.0, 0.0)))
            .await
            .unwrap();
        store
            .add_review(location.id, Review::new("Ann", 4.0, "Good"))
            .await
            .unwrap();

        assert_eq!(refresh_location_rating(&store, location.id).await, None);

        let stored = store.get_location(location.id).await.unwrap().unwrap();
        assert_eq!(stored.rating, 0.0);
    }
}
