use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{
    entities::bookings::BookingEntity,
    value_objects::{
        enums::booking_statuses::BookingStatus,
        pagination::{PageRequest, Pagination},
    },
};

#[derive(Debug, Clone, PartialEq)]
pub struct BookingFilter {
    pub page: PageRequest,
    pub booking_status: Option<BookingStatus>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub business_id: Uuid,
    pub service_id: Uuid,
    pub provider_user_id: Uuid,
    pub booking_status: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BookingEntity> for BookingDto {
    fn from(value: BookingEntity) -> Self {
        Self {
            id: value.id,
            user_id: value.user_id,
            business_id: value.business_id,
            service_id: value.service_id,
            provider_user_id: value.provider_user_id,
            booking_status: value.booking_status,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BookingListingDto {
    pub bookings: Vec<BookingDto>,
    pub pagination: Pagination,
}
