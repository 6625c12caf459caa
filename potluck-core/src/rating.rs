//! Per-recipe rating aggregation.
//!
//! A recipe carries its ratings inline. Each user holds at most one entry;
//! rating again replaces the value and refreshes the timestamp. The average
//! and count shown to clients are always derived from the entries via
//! [`RatingSummary::of`], never tracked separately.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::RatingError;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// A star rating validated to lie in `MIN_RATING..=MAX_RATING`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct RatingValue(u8);

impl RatingValue {
    pub fn new(value: i64) -> Result<Self, RatingError> {
        if (i64::from(MIN_RATING)..=i64::from(MAX_RATING)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(RatingError::OutOfRange(value))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for RatingValue {
    type Error = RatingError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RatingValue> for u8 {
    fn from(value: RatingValue) -> Self {
        value.0
    }
}

/// One user's rating of a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub user: Uuid,
    #[schema(value_type = u8, minimum = 1, maximum = 5)]
    pub rating: RatingValue,
    pub created_at: DateTime<Utc>,
}

/// Derived statistics for a set of ratings.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    /// Mean rating rounded half-up to one decimal place, 0 when unrated.
    pub average_rating: f64,
    pub total_ratings: u32,
}

impl RatingSummary {
    pub fn of(ratings: &[Rating]) -> Self {
        let total = ratings.len() as u64;
        if total == 0 {
            return Self::default();
        }

        let sum: u64 = ratings.iter().map(|r| u64::from(r.rating.get())).sum();
        // Rounded in integer tenths so that exact halves always round up.
        let tenths = (sum * 20 + total) / (total * 2);

        Self {
            average_rating: tenths as f64 / 10.0,
            total_ratings: total as u32,
        }
    }
}

/// The ordered rating entries embedded in a recipe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ratings(Vec<Rating>);

impl Ratings {
    pub fn new(entries: Vec<Rating>) -> Self {
        Self(entries)
    }

    pub fn entries(&self) -> &[Rating] {
        &self.0
    }

    pub fn into_entries(self) -> Vec<Rating> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn find(&self, user: Uuid) -> Option<&Rating> {
        self.0.iter().find(|r| r.user == user)
    }

    pub fn summary(&self) -> RatingSummary {
        RatingSummary::of(&self.0)
    }

    /// Records `value` as `rater`'s rating and returns the recomputed summary.
    ///
    /// An existing entry for the same user is updated in place (value and
    /// timestamp); otherwise a new entry is appended. On error the entries are
    /// left untouched.
    pub fn submit(
        &mut self,
        rater: Option<Uuid>,
        value: i64,
        now: DateTime<Utc>,
    ) -> Result<RatingSummary, RatingError> {
        let user = rater.ok_or(RatingError::Unauthenticated)?;
        let rating = RatingValue::new(value)?;

        match self.0.iter_mut().find(|r| r.user == user) {
            Some(existing) => {
                existing.rating = rating;
                existing.created_at = now;
            }
            None => self.0.push(Rating {
                user,
                rating,
                created_at: now,
            }),
        }

        Ok(self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rating(value: u8) -> Rating {
        Rating {
            user: Uuid::new_v4(),
            rating: RatingValue::new(i64::from(value)).unwrap(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_summary_is_zero() {
        let summary = RatingSummary::of(&[]);
        assert_eq!(summary.average_rating, 0.0);
        assert_eq!(summary.total_ratings, 0);
    }

    #[test]
    fn test_average_rounds_to_one_decimal() {
        let summary = RatingSummary::of(&[rating(1), rating(5), rating(4)]);
        assert_eq!(summary.average_rating, 3.3);
        assert_eq!(summary.total_ratings, 3);
    }

    #[test]
    fn test_average_rounds_exact_half_up() {
        // 13 / 4 = 3.25
        let summary = RatingSummary::of(&[rating(3), rating(3), rating(3), rating(4)]);
        assert_eq!(summary.average_rating, 3.3);
    }

    #[test]
    fn test_average_rounds_up_from_above_half() {
        // 11 / 3 = 3.666...
        let summary = RatingSummary::of(&[rating(3), rating(4), rating(4)]);
        assert_eq!(summary.average_rating, 3.7);
    }

    #[test]
    fn test_rating_value_bounds() {
        assert!(RatingValue::new(1).is_ok());
        assert!(RatingValue::new(5).is_ok());
        assert_eq!(RatingValue::new(0), Err(RatingError::OutOfRange(0)));
        assert_eq!(RatingValue::new(6), Err(RatingError::OutOfRange(6)));
        assert_eq!(RatingValue::new(-3), Err(RatingError::OutOfRange(-3)));
    }

    #[test]
    fn test_submit_without_user_is_rejected() {
        let mut ratings = Ratings::default();
        let result = ratings.submit(None, 4, Utc::now());
        assert_eq!(result, Err(RatingError::Unauthenticated));
        assert!(ratings.is_empty());
    }

    #[test]
    fn test_rating_json_shape() {
        let user = Uuid::new_v4();
        let json = serde_json::json!({
            "user": user,
            "rating": 4,
            "createdAt": "2024-05-01T12:00:00Z",
        });
        let parsed: Rating = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.user, user);
        assert_eq!(parsed.rating.get(), 4);

        let out = serde_json::to_value(&parsed).unwrap();
        assert_eq!(out["rating"], 4);
        assert!(out.get("createdAt").is_some());
    }

    #[test]
    fn test_stored_rating_out_of_range_fails_to_parse() {
        let json = serde_json::json!({
            "user": Uuid::new_v4(),
            "rating": 9,
            "createdAt": "2024-05-01T12:00:00Z",
        });
        assert!(serde_json::from_value::<Rating>(json).is_err());
    }
}
