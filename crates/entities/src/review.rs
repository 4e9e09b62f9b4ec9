//! Review entity definitions and the rating aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Violations;

/// Lowest rating a review may carry.
pub const MIN_RATING: f64 = 0.0;

/// Highest rating a review may carry.
pub const MAX_RATING: f64 = 5.0;

/// Returns true if `rating` is a finite value in [`MIN_RATING`, `MAX_RATING`].
pub fn is_valid_rating(rating: f64) -> bool {
    rating.is_finite() && (MIN_RATING..=MAX_RATING).contains(&rating)
}

/// A rated comment embedded in exactly one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    /// Unique identifier within the parent location.
    pub id: Uuid,
    /// Display name of the author.
    pub author: String,
    /// Rating in [0, 5].
    pub rating: f64,
    /// Review body.
    pub review_text: String,
    /// When the review was written. Never changes after creation.
    pub created_on: DateTime<Utc>,
}

impl Review {
    /// Creates a new review stamped with the current time.
    pub fn new(author: impl Into<String>, rating: f64, review_text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            author: author.into(),
            rating,
            review_text: review_text.into(),
            created_on: Utc::now(),
        }
    }

    /// Applies the fields present in `patch`, leaving the rest untouched.
    pub fn apply(&mut self, patch: ReviewPatch) {
        if let Some(author) = patch.author {
            self.author = author;
        }
        if let Some(rating) = patch.rating {
            self.rating = rating;
        }
        if let Some(review_text) = patch.review_text {
            self.review_text = review_text;
        }
    }

    pub(crate) fn check(&self, prefix: &str, violations: &mut Violations) {
        violations.require_text(format!("{prefix}author"), &self.author);
        violations.require_text(format!("{prefix}reviewText"), &self.review_text);
        if !is_valid_rating(self.rating) {
            violations.push(format!("{prefix}rating"), "must be between 0 and 5");
        }
    }

    /// Validates this review on its own.
    pub fn validate(&self) -> Result<(), crate::ValidationError> {
        let mut violations = Violations::new();
        self.check("", &mut violations);
        violations.into_result("Review")
    }
}

/// Partial update for a review. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewPatch {
    pub author: Option<String>,
    pub rating: Option<f64>,
    pub review_text: Option<String>,
}

/// Mean rating of `reviews` rounded to two decimals, or 0 when there are none.
pub fn average_rating(reviews: &[Review]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }

    let total: f64 = reviews.iter().map(|r| r.rating).sum();
    let mean = total / reviews.len() as f64;

    (mean * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(rating: f64) -> Review {
        Review::new("Simon", rating, "Lovely coffee")
    }

    #[test]
    fn test_average_rating() {
        assert_eq!(average_rating(&[]), 0.0);
        assert_eq!(average_rating(&[review(4.0), review(5.0)]), 4.5);
        assert_eq!(average_rating(&[review(1.0), review(2.0), review(2.0)]), 1.67);
        assert_eq!(average_rating(&[review(3.0)]), 3.0);
    }

    #[test]
    fn test_apply_patch_only_touches_given_fields() {
        let mut r = review(3.0);
        let before = r.clone();

        r.apply(ReviewPatch {
            rating: Some(5.0),
            ..Default::default()
        });

        assert_eq!(r.rating, 5.0);
        assert_eq!(r.author, before.author);
        assert_eq!(r.review_text, before.review_text);
        assert_eq!(r.created_on, before.created_on);
        assert_eq!(r.id, before.id);
    }

    #[test]
    fn test_validate_rejects_out_of_range_rating() {
        assert!(review(5.0).validate().is_ok());
        assert!(review(0.0).validate().is_ok());

        let err = review(5.5).validate().unwrap_err();
        assert_eq!(err.violations[0].field, "rating");
        assert!(review(-1.0).validate().is_err());
        assert!(review(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_validate_requires_author_and_text() {
        let err = Review::new("", 4.0, " ").validate().unwrap_err();
        let fields: Vec<_> = err.violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["author", "reviewText"]);
    }
}
