use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{business_profiles, subscriptions},
    },
};
use domain::{
    entities::subscriptions::{SubscriptionEntity, UpsertSubscriptionEntity},
    repositories::subscriptions::SubscriptionRepository,
    value_objects::enums::{
        subscription_statuses::SubscriptionStatus, subscription_types::SubscriptionType,
    },
};

pub struct SubscriptionPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl SubscriptionPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl SubscriptionRepository for SubscriptionPostgres {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<SubscriptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = subscriptions::table
            .filter(subscriptions::user_id.eq(user_id))
            .select(SubscriptionEntity::as_select())
            .first::<SubscriptionEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn list_due(&self, now: DateTime<Utc>) -> Result<Vec<SubscriptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let billable: Vec<&str> = SubscriptionStatus::BILLABLE
            .iter()
            .map(|status| status.as_str())
            .collect();

        let results = subscriptions::table
            .filter(subscriptions::subscription_status.eq_any(billable))
            .filter(subscriptions::subscription_expiry_date.le(now))
            .order(subscriptions::subscription_expiry_date.asc())
            .select(SubscriptionEntity::as_select())
            .load::<SubscriptionEntity>(&mut conn)?;

        Ok(results)
    }

    async fn save_with_business_tier(
        &self,
        subscription: UpsertSubscriptionEntity,
        business_tier: Option<SubscriptionType>,
    ) -> Result<SubscriptionEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let now = Utc::now();

        let saved = conn.transaction::<SubscriptionEntity, diesel::result::Error, _>(|conn| {
            let saved = insert_into(subscriptions::table)
                .values(&subscription)
                .on_conflict(subscriptions::user_id)
                .do_update()
                .set((&subscription, subscriptions::updated_at.eq(now)))
                .returning(SubscriptionEntity::as_select())
                .get_result::<SubscriptionEntity>(conn)?;

            if let Some(tier) = business_tier {
                update(business_profiles::table)
                    .filter(business_profiles::user_id.eq(subscription.user_id))
                    .set((
                        business_profiles::subscription_type.eq(tier.as_str()),
                        business_profiles::updated_at.eq(now),
                    ))
                    .execute(conn)?;
            }

            Ok(saved)
        })?;

        Ok(saved)
    }
}
