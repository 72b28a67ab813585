use std::sync::Arc;

use anyhow::{Result, anyhow};
use marketplace::domain::{
    entities::subscriptions::{SubscriptionEntity, UpsertSubscriptionEntity},
    repositories::subscriptions::SubscriptionRepository,
    value_objects::{enums::subscription_statuses::SubscriptionStatus, plans::business_tier_for_status},
};
use tracing::{error, info};

/// The only writer of the subscription status and the owning business tier.
pub struct SubscriptionStateWriter<S>
where
    S: SubscriptionRepository + Send + Sync + 'static,
{
    subscription_repo: Arc<S>,
}

impl<S> Clone for SubscriptionStateWriter<S>
where
    S: SubscriptionRepository + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            subscription_repo: Arc::clone(&self.subscription_repo),
        }
    }
}

impl<S> SubscriptionStateWriter<S>
where
    S: SubscriptionRepository + Send + Sync + 'static,
{
    pub fn new(subscription_repo: Arc<S>) -> Self {
        Self { subscription_repo }
    }

    pub async fn persist(&self, state: UpsertSubscriptionEntity) -> Result<SubscriptionEntity> {
        let user_id = state.user_id;
        let status = SubscriptionStatus::from_str(&state.subscription_status).ok_or_else(|| {
            anyhow!(
                "unknown subscription status '{}'",
                state.subscription_status
            )
        })?;
        let business_tier = business_tier_for_status(status);

        let saved = self
            .subscription_repo
            .save_with_business_tier(state, business_tier)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    %status,
                    db_error = ?err,
                    "subscription_sync: failed to persist subscription state"
                );
                err
            })?;

        info!(
            %user_id,
            %status,
            business_tier = business_tier.map(|tier| tier.as_str()).unwrap_or("unchanged"),
            "subscription_sync: state persisted"
        );
        Ok(saved)
    }
}
