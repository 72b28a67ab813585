use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::{entities::bookings::BookingEntity, value_objects::bookings::BookingFilter};

#[automock]
#[async_trait]
pub trait BookingRepository {
    async fn list_paginated(&self, filter: BookingFilter) -> Result<(Vec<BookingEntity>, i64)>;
}
