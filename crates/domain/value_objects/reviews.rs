use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::reviews::ReviewEntity;

pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 5;

pub fn is_valid_rating(rating: i16) -> bool {
    (MIN_RATING..=MAX_RATING).contains(&rating)
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub average_rating: f64,
    pub total_reviews: i64,
}

impl RatingSummary {
    /// Zero reviews averages to `0`.
    pub fn from_ratings(ratings: &[i16]) -> Self {
        if ratings.is_empty() {
            return Self::default();
        }
        let sum: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
        let total_reviews = ratings.len() as i64;

        Self {
            average_rating: sum as f64 / total_reviews as f64,
            total_reviews,
        }
    }
}

/// Summary lookup that falls back to `{0, 0}` for businesses without reviews.
#[derive(Debug, Clone, Default)]
pub struct RatingSummaries(HashMap<Uuid, RatingSummary>);

impl RatingSummaries {
    pub fn get(&self, business_id: &Uuid) -> RatingSummary {
        self.0.get(business_id).copied().unwrap_or_default()
    }
}

impl FromIterator<(Uuid, RatingSummary)> for RatingSummaries {
    fn from_iter<I: IntoIterator<Item = (Uuid, RatingSummary)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub business_id: Uuid,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ReviewEntity> for ReviewDto {
    fn from(value: ReviewEntity) -> Self {
        Self {
            id: value.id,
            user_id: value.user_id,
            business_id: value.business_id,
            rating: value.rating,
            comment: value.comment,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BusinessReviewsDto {
    pub reviews: Vec<ReviewDto>,
    pub average_rating: f64,
    pub total_reviews: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateReviewModel {
    pub rating: i16,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateReviewModel {
    pub rating: Option<i16>,
    pub comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_ratings() {
        let summary = RatingSummary::from_ratings(&[5, 4, 4, 2]);
        assert_eq!(summary.total_reviews, 4);
        assert!((summary.average_rating - 3.75).abs() < f64::EPSILON);
    }

    #[test]
    fn no_reviews_is_zero() {
        assert_eq!(RatingSummary::from_ratings(&[]), RatingSummary::default());
        let summaries = RatingSummaries::default();
        assert_eq!(summaries.get(&Uuid::new_v4()).total_reviews, 0);
    }

    #[test]
    fn rating_bounds() {
        assert!(!is_valid_rating(0));
        assert!(is_valid_rating(1));
        assert!(is_valid_rating(5));
        assert!(!is_valid_rating(6));
    }
}
