use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::{payment_cards::PaymentCardEntity, subscriptions::SubscriptionEntity},
    value_objects::{
        enums::{expiry_reasons::ExpiryReason, subscription_statuses::SubscriptionStatus},
        plans::status_to_plan_type,
    },
};

pub const SUBSCRIPTION_METHOD_STRIPE: &str = "stripe";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveCardAndSubscribeModel {
    pub stripe_customer_id: String,
    pub stripe_payment_method_id: String,
    pub plan_type: i32,
    #[serde(default)]
    pub amount: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePlanModel {
    pub plan_type: i32,
    #[serde(default)]
    pub stripe_customer_id: Option<String>,
    #[serde(default)]
    pub stripe_payment_method_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCardModel {
    #[serde(default)]
    pub stripe_customer_id: Option<String>,
    pub stripe_payment_method_id: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subscription_status: Option<SubscriptionStatus>,
    pub plan_type: i32,
    pub subscription_start_date: Option<DateTime<Utc>>,
    pub subscription_expiry_date: Option<DateTime<Utc>>,
    pub previous_subscription_status: Option<SubscriptionStatus>,
    pub expiry_reason: Option<ExpiryReason>,
    pub payment_card_id: Option<Uuid>,
    pub subscription_method: String,
    pub subscription_method_id: Option<String>,
}

impl From<SubscriptionEntity> for SubscriptionDto {
    fn from(value: SubscriptionEntity) -> Self {
        let status = SubscriptionStatus::from_str(&value.subscription_status);
        Self {
            id: value.id,
            user_id: value.user_id,
            plan_type: status.map(status_to_plan_type).unwrap_or_default(),
            subscription_status: status,
            subscription_start_date: value.subscription_start_date,
            subscription_expiry_date: value.subscription_expiry_date,
            previous_subscription_status: value
                .previous_subscription_status
                .as_deref()
                .and_then(SubscriptionStatus::from_str),
            expiry_reason: value.expiry_reason.as_deref().and_then(ExpiryReason::from_code),
            payment_card_id: value.payment_card_id,
            subscription_method: value.subscription_method,
            subscription_method_id: value.subscription_method_id,
        }
    }
}

/// Card projection safe to return to clients.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCardDto {
    pub id: Uuid,
    pub stripe_customer_id: String,
    pub stripe_payment_method_id: String,
    pub last4: Option<String>,
    pub brand: Option<String>,
}

impl From<PaymentCardEntity> for PaymentCardDto {
    fn from(value: PaymentCardEntity) -> Self {
        Self {
            id: value.id,
            stripe_customer_id: value.stripe_customer_id,
            stripe_payment_method_id: value.stripe_payment_method_id,
            last4: value.card_last4_number,
            brand: value.card_brand,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SubscriptionDetailsDto {
    pub subscription: Option<SubscriptionDto>,
    pub card: Option<PaymentCardDto>,
}

impl SubscriptionDetailsDto {
    pub fn new(
        subscription: Option<SubscriptionEntity>,
        card: Option<PaymentCardEntity>,
    ) -> Self {
        Self {
            subscription: subscription.map(SubscriptionDto::from),
            card: card.map(PaymentCardDto::from),
        }
    }
}
