use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::reviews;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable, PartialEq)]
#[diesel(table_name = reviews)]
pub struct ReviewEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub business_id: Uuid,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, PartialEq)]
#[diesel(table_name = reviews)]
pub struct InsertReviewEntity {
    pub user_id: Uuid,
    pub business_id: Uuid,
    pub rating: i16,
    pub comment: Option<String>,
}

/// `None` leaves the column untouched. `comment: Some(None)` clears it.
#[derive(Debug, Clone, Default, AsChangeset, PartialEq)]
#[diesel(table_name = reviews)]
pub struct EditReviewEntity {
    pub rating: Option<i16>,
    pub comment: Option<Option<String>>,
    pub updated_at: Option<DateTime<Utc>>,
}
