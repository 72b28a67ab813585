use std::sync::Arc;

use anyhow::Result;
use marketplace::domain::{
    repositories::reviews::ReviewRepository,
    value_objects::reviews::{BusinessReviewsDto, RatingSummaries, RatingSummary, ReviewDto},
};
use tracing::debug;
use uuid::Uuid;

/// Read-side rating aggregation shared by ranking, discovery and listings.
pub struct ReviewAggregator<R>
where
    R: ReviewRepository + Send + Sync + 'static,
{
    review_repo: Arc<R>,
}

impl<R> ReviewAggregator<R>
where
    R: ReviewRepository + Send + Sync + 'static,
{
    pub fn new(review_repo: Arc<R>) -> Self {
        Self { review_repo }
    }

    pub async fn get_reviews(&self, business_id: Uuid) -> Result<BusinessReviewsDto> {
        let reviews = self.review_repo.list_for_business(business_id).await?;

        let ratings: Vec<i16> = reviews.iter().map(|review| review.rating).collect();
        let summary = RatingSummary::from_ratings(&ratings);

        Ok(BusinessReviewsDto {
            reviews: reviews.into_iter().map(ReviewDto::from).collect(),
            average_rating: summary.average_rating,
            total_reviews: summary.total_reviews,
        })
    }

    /// Businesses without reviews resolve to `{0, 0}` through `RatingSummaries::get`.
    pub async fn summaries(&self, business_ids: Vec<Uuid>) -> Result<RatingSummaries> {
        if business_ids.is_empty() {
            return Ok(RatingSummaries::default());
        }
        let requested = business_ids.len();
        let rows = self.review_repo.rating_summaries(business_ids).await?;
        debug!(requested, reviewed = rows.len(), "reviews: summaries loaded");

        Ok(rows.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use marketplace::domain::{
        entities::reviews::ReviewEntity, repositories::reviews::MockReviewRepository,
    };
    use mockall::predicate::eq;

    fn review(business_id: Uuid, rating: i16) -> ReviewEntity {
        ReviewEntity {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            business_id,
            rating,
            comment: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn get_reviews_averages_ratings() {
        let business_id = Uuid::new_v4();
        let mut review_repo = MockReviewRepository::new();
        let reviews = vec![review(business_id, 5), review(business_id, 2)];

        review_repo
            .expect_list_for_business()
            .with(eq(business_id))
            .returning(move |_| Ok(reviews.clone()));

        let aggregator = ReviewAggregator::new(Arc::new(review_repo));
        let result = aggregator.get_reviews(business_id).await.unwrap();

        assert_eq!(result.total_reviews, 2);
        assert!((result.average_rating - 3.5).abs() < f64::EPSILON);
        assert_eq!(result.reviews.len(), 2);
    }

    #[tokio::test]
    async fn get_reviews_without_reviews_is_zero() {
        let mut review_repo = MockReviewRepository::new();
        review_repo
            .expect_list_for_business()
            .returning(|_| Ok(Vec::new()));

        let aggregator = ReviewAggregator::new(Arc::new(review_repo));
        let result = aggregator.get_reviews(Uuid::new_v4()).await.unwrap();

        assert_eq!(result.total_reviews, 0);
        assert_eq!(result.average_rating, 0.0);
    }

    #[tokio::test]
    async fn summaries_default_missing_businesses() {
        let reviewed = Uuid::new_v4();
        let unreviewed = Uuid::new_v4();
        let mut review_repo = MockReviewRepository::new();

        review_repo
            .expect_rating_summaries()
            .with(eq(vec![reviewed, unreviewed]))
            .returning(move |_| {
                Ok(vec![(
                    reviewed,
                    RatingSummary {
                        average_rating: 4.5,
                        total_reviews: 2,
                    },
                )])
            });

        let aggregator = ReviewAggregator::new(Arc::new(review_repo));
        let summaries = aggregator.summaries(vec![reviewed, unreviewed]).await.unwrap();

        assert_eq!(summaries.get(&reviewed).total_reviews, 2);
        assert_eq!(summaries.get(&unreviewed), RatingSummary::default());
    }

    #[tokio::test]
    async fn summaries_skip_the_query_for_no_ids() {
        let review_repo = MockReviewRepository::new();
        let aggregator = ReviewAggregator::new(Arc::new(review_repo));
        let summaries = aggregator.summaries(Vec::new()).await.unwrap();
        assert_eq!(summaries.get(&Uuid::new_v4()).total_reviews, 0);
    }
}
