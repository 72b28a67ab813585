use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::subscriptions;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable, PartialEq)]
#[diesel(table_name = subscriptions)]
pub struct SubscriptionEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subscription_status: String,
    pub subscription_start_date: Option<DateTime<Utc>>,
    pub subscription_expiry_date: Option<DateTime<Utc>>,
    pub previous_subscription_status: Option<String>,
    pub expiry_reason: Option<String>,
    pub payment_card_id: Option<Uuid>,
    pub subscription_method: String,
    pub subscription_method_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full row state written by the subscription state writer.
///
/// Optional fields are written as NULL, so a writer that wants to keep a value must copy it in.
#[derive(Debug, Clone, Insertable, AsChangeset, PartialEq)]
#[diesel(table_name = subscriptions, treat_none_as_null = true)]
pub struct UpsertSubscriptionEntity {
    pub user_id: Uuid,
    pub subscription_status: String,
    pub subscription_start_date: Option<DateTime<Utc>>,
    pub subscription_expiry_date: Option<DateTime<Utc>>,
    pub previous_subscription_status: Option<String>,
    pub expiry_reason: Option<String>,
    pub payment_card_id: Option<Uuid>,
    pub subscription_method: String,
    pub subscription_method_id: Option<String>,
}

impl From<&SubscriptionEntity> for UpsertSubscriptionEntity {
    fn from(value: &SubscriptionEntity) -> Self {
        Self {
            user_id: value.user_id,
            subscription_status: value.subscription_status.clone(),
            subscription_start_date: value.subscription_start_date,
            subscription_expiry_date: value.subscription_expiry_date,
            previous_subscription_status: value.previous_subscription_status.clone(),
            expiry_reason: value.expiry_reason.clone(),
            payment_card_id: value.payment_card_id,
            subscription_method: value.subscription_method.clone(),
            subscription_method_id: value.subscription_method_id.clone(),
        }
    }
}
