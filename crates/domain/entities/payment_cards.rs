use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::payment_cards;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable, PartialEq)]
#[diesel(table_name = payment_cards)]
pub struct PaymentCardEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub stripe_customer_id: String,
    pub stripe_payment_method_id: String,
    pub card_last4_number: Option<String>,
    pub card_brand: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, AsChangeset, PartialEq)]
#[diesel(table_name = payment_cards, treat_none_as_null = true)]
pub struct UpsertPaymentCardEntity {
    pub user_id: Uuid,
    pub stripe_customer_id: String,
    pub stripe_payment_method_id: String,
    pub card_last4_number: Option<String>,
    pub card_brand: Option<String>,
}
