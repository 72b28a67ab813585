use anyhow::Result;
use async_trait::async_trait;
use diesel::{
    RunQueryDsl,
    dsl::{count_star, sum},
    insert_into,
    prelude::*,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::reviews},
};
use domain::{
    entities::reviews::{EditReviewEntity, InsertReviewEntity, ReviewEntity},
    repositories::reviews::ReviewRepository,
    value_objects::reviews::RatingSummary,
};

pub struct ReviewPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ReviewPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ReviewRepository for ReviewPostgres {
    async fn rating_summaries(&self, business_ids: Vec<Uuid>) -> Result<Vec<(Uuid, RatingSummary)>> {
        if business_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = reviews::table
            .filter(reviews::business_id.eq_any(business_ids))
            .group_by(reviews::business_id)
            .select((reviews::business_id, sum(reviews::rating), count_star()))
            .load::<(Uuid, Option<i64>, i64)>(&mut conn)?;

        let summaries = rows
            .into_iter()
            .map(|(business_id, rating_sum, total_reviews)| {
                let average_rating = if total_reviews == 0 {
                    0.0
                } else {
                    rating_sum.unwrap_or(0) as f64 / total_reviews as f64
                };
                (
                    business_id,
                    RatingSummary {
                        average_rating,
                        total_reviews,
                    },
                )
            })
            .collect();

        Ok(summaries)
    }

    async fn list_for_business(&self, business_id: Uuid) -> Result<Vec<ReviewEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = reviews::table
            .filter(reviews::business_id.eq(business_id))
            .order(reviews::created_at.desc())
            .select(ReviewEntity::as_select())
            .load::<ReviewEntity>(&mut conn)?;

        Ok(results)
    }

    async fn insert(&self, review: InsertReviewEntity) -> Result<Option<ReviewEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(reviews::table)
            .values(&review)
            .on_conflict((reviews::user_id, reviews::business_id))
            .do_nothing()
            .returning(ReviewEntity::as_select())
            .get_result::<ReviewEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn update_owned(
        &self,
        review_id: Uuid,
        user_id: Uuid,
        changes: EditReviewEntity,
    ) -> Result<Option<ReviewEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = diesel::update(
            reviews::table
                .filter(reviews::id.eq(review_id))
                .filter(reviews::user_id.eq(user_id)),
        )
        .set(&changes)
        .returning(ReviewEntity::as_select())
        .get_result::<ReviewEntity>(&mut conn)
        .optional()?;

        Ok(result)
    }

    async fn delete_owned(&self, review_id: Uuid, user_id: Uuid) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let deleted = diesel::delete(
            reviews::table
                .filter(reviews::id.eq(review_id))
                .filter(reviews::user_id.eq(user_id)),
        )
        .execute(&mut conn)?;

        Ok(deleted > 0)
    }
}
