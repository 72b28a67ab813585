use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::reviews::{EditReviewEntity, InsertReviewEntity, ReviewEntity},
    value_objects::reviews::RatingSummary,
};

#[automock]
#[async_trait]
pub trait ReviewRepository {
    /// Only businesses with at least one review are returned.
    async fn rating_summaries(&self, business_ids: Vec<Uuid>) -> Result<Vec<(Uuid, RatingSummary)>>;

    async fn list_for_business(&self, business_id: Uuid) -> Result<Vec<ReviewEntity>>;

    /// `None` when the user already reviewed the business.
    async fn insert(&self, review: InsertReviewEntity) -> Result<Option<ReviewEntity>>;

    async fn update_owned(
        &self,
        review_id: Uuid,
        user_id: Uuid,
        changes: EditReviewEntity,
    ) -> Result<Option<ReviewEntity>>;

    async fn delete_owned(&self, review_id: Uuid, user_id: Uuid) -> Result<bool>;
}
