//! Review API endpoints.
//!
//! Reviews live inside their location. Every mutation is followed by a refresh
//! of the location's rating aggregate.

use api_protocol::{CreateReviewRequest, ReviewWithLocation, UpdateReviewRequest};
use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use entities::{Review, ReviewPatch};
use location_store::LocationStore;

use super::{non_blank, path_id};
use crate::error::{ServerError, ServerResult};
use crate::middleware::AuthenticatedUser;
use crate::services::rating::refresh_location_rating;
use crate::state::SharedState;

/// Looks up the display name of the token's owner.
async fn resolve_author<S: LocationStore>(store: &S, user: &AuthenticatedUser) -> ServerResult<String> {
    store
        .get_user_by_email(&user.email)
        .await?
        .map(|u| u.name)
        .ok_or_else(|| ServerError::NotFound("User not found".to_string()))
}

/// Adds a review by the authenticated user.
pub async fn create_review<S: LocationStore>(
    State(state): State<SharedState<S>>,
    Path(location_id): Path<String>,
    Extension(user): Extension<AuthenticatedUser>,
    payload: Result<Json<CreateReviewRequest>, JsonRejection>,
) -> ServerResult<(StatusCode, Json<api_protocol::Review>)> {
    let location_id = path_id(&location_id);
    let Json(request) = payload?;

    let author = resolve_author(&state.store, &user).await?;

    let (Some(rating), Some(review_text)) = (request.rating, non_blank(request.review_text)) else {
        return Err(ServerError::InvalidRequest(
            "Rating and review text are required".to_string(),
        ));
    };

    let review = state
        .store
        .add_review(location_id, Review::new(author, rating, review_text))
        .await?;

    tracing::info!(
        location_id = %location_id,
        review_id = %review.id,
        user_id = %user.id,
        "Created review"
    );

    refresh_location_rating(&state.store, location_id).await;

    Ok((StatusCode::CREATED, Json((&review).into())))
}

/// Gets a review together with its location's name and id.
pub async fn read_review<S: LocationStore>(
    State(state): State<SharedState<S>>,
    Path((location_id, review_id)): Path<(String, String)>,
) -> ServerResult<Json<ReviewWithLocation>> {
    let location = state
        .store
        .get_location(path_id(&location_id))
        .await?
        .ok_or_else(|| ServerError::NotFound("Location not found".to_string()))?;

    let review = location
        .review(path_id(&review_id))
        .ok_or_else(|| ServerError::NotFound("Review not found".to_string()))?;

    Ok(Json(ReviewWithLocation::new(&location, review)))
}

/// Replaces the supplied fields of a review.
pub async fn update_review<S: LocationStore>(
    State(state): State<SharedState<S>>,
    Path((location_id, review_id)): Path<(String, String)>,
    Extension(user): Extension<AuthenticatedUser>,
    payload: Result<Json<UpdateReviewRequest>, JsonRejection>,
) -> ServerResult<Json<api_protocol::Review>> {
    let location_id = path_id(&location_id);
    let Json(request) = payload?;

    let patch = ReviewPatch {
        author: non_blank(request.author),
        rating: request.rating,
        review_text: non_blank(request.review_text),
    };

    let review = state
        .store
        .update_review(location_id, path_id(&review_id), patch)
        .await?;

    tracing::info!(
        location_id = %location_id,
        review_id = %review.id,
        user_id = %user.id,
        "Updated review"
    );

    refresh_location_rating(&state.store, location_id).await;

    Ok(Json((&review).into()))
}

/// Deletes a review.
pub async fn delete_review<S: LocationStore>(
    State(state): State<SharedState<S>>,
    Path((location_id, review_id)): Path<(String, String)>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ServerResult<StatusCode> {
    let location_id = path_id(&location_id);
    let review_id = path_id(&review_id);

    state.store.delete_review(location_id, review_id).await?;

    tracing::info!(
        location_id = %location_id,
        review_id = %review_id,
        user_id = %user.id,
        "Deleted review"
    );

    refresh_location_rating(&state.store, location_id).await;

    Ok(StatusCode::NO_CONTENT)
}
