use std::sync::Arc;

use chrono::Utc;
use marketplace::domain::{
    entities::reviews::{EditReviewEntity, InsertReviewEntity},
    repositories::{business_profiles::BusinessProfileRepository, reviews::ReviewRepository},
    value_objects::reviews::{
        BusinessReviewsDto, CreateReviewModel, MAX_RATING, MIN_RATING, ReviewDto,
        UpdateReviewModel, is_valid_rating,
    },
};
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use super::review_aggregator::ReviewAggregator;

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("{0}")]
    Validation(String),
    #[error("business not found")]
    BusinessNotFound,
    #[error("review not found")]
    ReviewNotFound,
    #[error("business already reviewed by this user")]
    AlreadyReviewed,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ReviewError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            ReviewError::Validation(_) => StatusCode::BAD_REQUEST,
            ReviewError::BusinessNotFound | ReviewError::ReviewNotFound => StatusCode::NOT_FOUND,
            ReviewError::AlreadyReviewed => StatusCode::CONFLICT,
            ReviewError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn validate_rating(rating: i16) -> Result<i16, ReviewError> {
    if is_valid_rating(rating) {
        Ok(rating)
    } else {
        Err(ReviewError::Validation(format!(
            "rating must be between {MIN_RATING} and {MAX_RATING}"
        )))
    }
}

fn normalize_comment(comment: Option<String>) -> Option<String> {
    comment
        .map(|comment| comment.trim().to_string())
        .filter(|comment| !comment.is_empty())
}

pub struct ReviewUseCase<R, B>
where
    R: ReviewRepository + Send + Sync + 'static,
    B: BusinessProfileRepository + Send + Sync + 'static,
{
    review_repo: Arc<R>,
    business_repo: Arc<B>,
    aggregator: ReviewAggregator<R>,
}

impl<R, B> ReviewUseCase<R, B>
where
    R: ReviewRepository + Send + Sync + 'static,
    B: BusinessProfileRepository + Send + Sync + 'static,
{
    pub fn new(review_repo: Arc<R>, business_repo: Arc<B>) -> Self {
        let aggregator = ReviewAggregator::new(Arc::clone(&review_repo));
        Self {
            review_repo,
            business_repo,
            aggregator,
        }
    }

    pub async fn list_reviews(&self, business_id: Uuid) -> Result<BusinessReviewsDto, ReviewError> {
        self.aggregator.get_reviews(business_id).await.map_err(|err| {
            error!(%business_id, db_error = ?err, "reviews: failed to list reviews");
            ReviewError::Internal(err)
        })
    }

    pub async fn create_review(
        &self,
        user_id: Uuid,
        business_id: Uuid,
        model: CreateReviewModel,
    ) -> Result<ReviewDto, ReviewError> {
        let rating = validate_rating(model.rating)?;

        if self.business_repo.find_by_id(business_id).await?.is_none() {
            return Err(ReviewError::BusinessNotFound);
        }

        let inserted = self
            .review_repo
            .insert(InsertReviewEntity {
                user_id,
                business_id,
                rating,
                comment: normalize_comment(model.comment),
            })
            .await
            .map_err(|err| {
                error!(%user_id, %business_id, db_error = ?err, "reviews: insert failed");
                ReviewError::Internal(err)
            })?
            .ok_or(ReviewError::AlreadyReviewed)?;

        info!(%user_id, %business_id, review_id = %inserted.id, "reviews: created");
        Ok(ReviewDto::from(inserted))
    }

    pub async fn update_review(
        &self,
        user_id: Uuid,
        review_id: Uuid,
        model: UpdateReviewModel,
    ) -> Result<ReviewDto, ReviewError> {
        if model.rating.is_none() && model.comment.is_none() {
            return Err(ReviewError::Validation(
                "rating or comment is required".to_string(),
            ));
        }
        let rating = model.rating.map(validate_rating).transpose()?;

        let updated = self
            .review_repo
            .update_owned(
                review_id,
                user_id,
                EditReviewEntity {
                    rating,
                    comment: model.comment.map(|comment| normalize_comment(Some(comment))),
                    updated_at: Some(Utc::now()),
                },
            )
            .await?
            .ok_or(ReviewError::ReviewNotFound)?;

        info!(%user_id, %review_id, "reviews: updated");
        Ok(ReviewDto::from(updated))
    }

    pub async fn delete_review(&self, user_id: Uuid, review_id: Uuid) -> Result<(), ReviewError> {
        if !self.review_repo.delete_owned(review_id, user_id).await? {
            return Err(ReviewError::ReviewNotFound);
        }
        info!(%user_id, %review_id, "reviews: deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marketplace::domain::{
        entities::{business_profiles::BusinessProfileEntity, reviews::ReviewEntity},
        repositories::{
            business_profiles::MockBusinessProfileRepository, reviews::MockReviewRepository,
        },
    };
    use mockall::predicate::eq;

    fn business(id: Uuid) -> BusinessProfileEntity {
        BusinessProfileEntity {
            id,
            user_id: Uuid::new_v4(),
            business_name: "Corner Barber".to_string(),
            description: None,
            tags: vec!["barber".to_string()],
            slug: "corner-barber".to_string(),
            longitude: 100.5,
            latitude: 13.7,
            state: None,
            city: None,
            postal_code: None,
            street_address: None,
            banner_image_url: None,
            subscription_type: "free".to_string(),
            is_approved: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn review(user_id: Uuid, business_id: Uuid, rating: i16) -> ReviewEntity {
        ReviewEntity {
            id: Uuid::new_v4(),
            user_id,
            business_id,
            rating,
            comment: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn creates_review_for_existing_business() {
        let user_id = Uuid::new_v4();
        let business_id = Uuid::new_v4();

        let mut business_repo = MockBusinessProfileRepository::new();
        business_repo
            .expect_find_by_id()
            .with(eq(business_id))
            .returning(|id| Ok(Some(business(id))));

        let mut review_repo = MockReviewRepository::new();
        review_repo
            .expect_insert()
            .withf(|review| review.rating == 4 && review.comment.as_deref() == Some("tidy fade"))
            .times(1)
            .returning(|review| Ok(Some(review_with(review))));

        let usecase = ReviewUseCase::new(Arc::new(review_repo), Arc::new(business_repo));
        let created = usecase
            .create_review(
                user_id,
                business_id,
                CreateReviewModel {
                    rating: 4,
                    comment: Some("  tidy fade ".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(created.rating, 4);
        assert_eq!(created.user_id, user_id);
    }

    fn review_with(insert: InsertReviewEntity) -> ReviewEntity {
        ReviewEntity {
            comment: insert.comment,
            ..review(insert.user_id, insert.business_id, insert.rating)
        }
    }

    #[tokio::test]
    async fn rejects_out_of_range_rating() {
        let usecase = ReviewUseCase::new(
            Arc::new(MockReviewRepository::new()),
            Arc::new(MockBusinessProfileRepository::new()),
        );

        for rating in [0, 6] {
            let err = usecase
                .create_review(
                    Uuid::new_v4(),
                    Uuid::new_v4(),
                    CreateReviewModel {
                        rating,
                        comment: None,
                    },
                )
                .await
                .unwrap_err();
            assert!(matches!(err, ReviewError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn missing_business_is_not_found() {
        let mut business_repo = MockBusinessProfileRepository::new();
        business_repo.expect_find_by_id().returning(|_| Ok(None));

        let usecase = ReviewUseCase::new(Arc::new(MockReviewRepository::new()), Arc::new(business_repo));
        let err = usecase
            .create_review(
                Uuid::new_v4(),
                Uuid::new_v4(),
                CreateReviewModel {
                    rating: 5,
                    comment: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ReviewError::BusinessNotFound));
    }

    #[tokio::test]
    async fn second_review_conflicts() {
        let mut business_repo = MockBusinessProfileRepository::new();
        business_repo
            .expect_find_by_id()
            .returning(|id| Ok(Some(business(id))));
        let mut review_repo = MockReviewRepository::new();
        review_repo.expect_insert().returning(|_| Ok(None));

        let usecase = ReviewUseCase::new(Arc::new(review_repo), Arc::new(business_repo));
        let err = usecase
            .create_review(
                Uuid::new_v4(),
                Uuid::new_v4(),
                CreateReviewModel {
                    rating: 3,
                    comment: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn editing_someone_elses_review_is_not_found() {
        let mut review_repo = MockReviewRepository::new();
        review_repo
            .expect_update_owned()
            .returning(|_, _, _| Ok(None));
        review_repo.expect_delete_owned().returning(|_, _| Ok(false));

        let usecase = ReviewUseCase::new(
            Arc::new(review_repo),
            Arc::new(MockBusinessProfileRepository::new()),
        );

        let err = usecase
            .update_review(
                Uuid::new_v4(),
                Uuid::new_v4(),
                UpdateReviewModel {
                    rating: Some(2),
                    comment: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ReviewError::ReviewNotFound));

        let err = usecase
            .delete_review(Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, ReviewError::ReviewNotFound));
    }

    #[tokio::test]
    async fn blank_comment_on_update_clears_it() {
        let user_id = Uuid::new_v4();
        let review_id = Uuid::new_v4();
        let business_id = Uuid::new_v4();

        let mut review_repo = MockReviewRepository::new();
        review_repo
            .expect_update_owned()
            .withf(move |id, owner, changes| {
                *id == review_id
                    && *owner == user_id
                    && changes.comment == Some(None)
                    && changes.rating.is_none()
            })
            .times(1)
            .returning(move |_, owner, _| Ok(Some(review(owner, business_id, 4))));

        let usecase = ReviewUseCase::new(
            Arc::new(review_repo),
            Arc::new(MockBusinessProfileRepository::new()),
        );
        let updated = usecase
            .update_review(
                user_id,
                review_id,
                UpdateReviewModel {
                    rating: None,
                    comment: Some("   ".to_string()),
                },
            )
            .await
            .unwrap();

        assert!(updated.comment.is_none());
    }

    #[tokio::test]
    async fn empty_update_is_rejected() {
        let usecase = ReviewUseCase::new(
            Arc::new(MockReviewRepository::new()),
            Arc::new(MockBusinessProfileRepository::new()),
        );
        let err = usecase
            .update_review(Uuid::new_v4(), Uuid::new_v4(), UpdateReviewModel::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ReviewError::Validation(_)));
    }

    #[tokio::test]
    async fn lists_reviews_with_summary() {
        let business_id = Uuid::new_v4();
        let mut review_repo = MockReviewRepository::new();
        review_repo
            .expect_list_for_business()
            .with(eq(business_id))
            .returning(move |id| {
                Ok(vec![
                    review(Uuid::new_v4(), id, 5),
                    review(Uuid::new_v4(), id, 3),
                ])
            });

        let usecase = ReviewUseCase::new(
            Arc::new(review_repo),
            Arc::new(MockBusinessProfileRepository::new()),
        );
        let listing = usecase.list_reviews(business_id).await.unwrap();

        assert_eq!(listing.total_reviews, 2);
        assert!((listing.average_rating - 4.0).abs() < f64::EPSILON);
    }
}
