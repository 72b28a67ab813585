use anyhow::Result;
use async_trait::async_trait;
use diesel::{pg::Pg, prelude::*};
use std::sync::Arc;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::bookings},
};
use domain::{
    entities::bookings::BookingEntity, repositories::bookings::BookingRepository,
    value_objects::bookings::BookingFilter,
};

pub struct BookingPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl BookingPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

fn booking_filter_query(filter: &BookingFilter) -> bookings::BoxedQuery<'static, Pg> {
    let mut query = bookings::table.into_boxed();
    if let Some(status) = filter.booking_status {
        query = query.filter(bookings::booking_status.eq(status.code()));
    }
    query
}

#[async_trait]
impl BookingRepository for BookingPostgres {
    async fn list_paginated(&self, filter: BookingFilter) -> Result<(Vec<BookingEntity>, i64)> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let total_docs = booking_filter_query(&filter)
            .count()
            .get_result::<i64>(&mut conn)?;

        let results = booking_filter_query(&filter)
            .order(bookings::created_at.desc())
            .offset(filter.page.offset())
            .limit(filter.page.limit)
            .select(BookingEntity::as_select())
            .load::<BookingEntity>(&mut conn)?;

        Ok((results, total_docs))
    }
}
