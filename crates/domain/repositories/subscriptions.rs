use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::subscriptions::{SubscriptionEntity, UpsertSubscriptionEntity},
    value_objects::enums::subscription_types::SubscriptionType,
};

#[automock]
#[async_trait]
pub trait SubscriptionRepository {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<SubscriptionEntity>>;

    /// Trial and paid subscriptions whose expiry date is at or before `now`.
    async fn list_due(&self, now: DateTime<Utc>) -> Result<Vec<SubscriptionEntity>>;

    /// Upserts the subscription on `user_id` and, when `business_tier` is set, writes the
    /// owner's business tier in the same transaction.
    async fn save_with_business_tier(
        &self,
        subscription: UpsertSubscriptionEntity,
        business_tier: Option<SubscriptionType>,
    ) -> Result<SubscriptionEntity>;
}
