use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{pg::Pg, prelude::*, sql_query, sql_types};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::business_profiles},
};
use domain::{
    entities::business_profiles::{BusinessProfileEntity, GeoCandidateRow, NearbyBusinessRow},
    repositories::business_profiles::BusinessProfileRepository,
    value_objects::{
        business_discovery::{AdminBusinessFilter, NearbyBusiness},
        enums::subscription_types::SubscriptionType,
        geo::{GeoCandidate, GeoPoint},
    },
};

// Haversine on a 6 378 100 m sphere. $1 = longitude, $2 = latitude.
const DISTANCE_SQL: &str = "6378100.0 * 2.0 * asin(sqrt(\
    power(sin(radians(bp.latitude - $2) / 2.0), 2) + \
    cos(radians($2)) * cos(radians(bp.latitude)) * \
    power(sin(radians(bp.longitude - $1) / 2.0), 2)))";

pub struct BusinessProfilePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl BusinessProfilePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

fn admin_filter_query(
    filter: &AdminBusinessFilter,
) -> business_profiles::BoxedQuery<'static, Pg> {
    let mut query = business_profiles::table.into_boxed();

    if let Some(is_approved) = filter.is_approved {
        query = query.filter(business_profiles::is_approved.eq(is_approved));
    }
    if let Some(search) = filter.search_text.as_deref() {
        let pattern = format!("%{}%", escape_like(search));
        query = query.filter(
            business_profiles::business_name
                .ilike(pattern.clone())
                .or(business_profiles::description.ilike(pattern)),
        );
    }

    query
}

/// Escapes LIKE wildcards so user text matches literally.
pub(crate) fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[async_trait]
impl BusinessProfileRepository for BusinessProfilePostgres {
    async fn find_geo_candidates(
        &self,
        point: GeoPoint,
        max_distance: f64,
    ) -> Result<Vec<GeoCandidate>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let query = format!(
            "SELECT id, distance, subscription_type FROM ( \
                SELECT bp.id, bp.subscription_type, {DISTANCE_SQL} AS distance \
                FROM business_profiles bp \
                WHERE bp.is_approved = TRUE \
            ) nearby \
            WHERE distance <= $3 \
            ORDER BY distance ASC"
        );

        let rows = sql_query(query)
            .bind::<sql_types::Double, _>(point.longitude)
            .bind::<sql_types::Double, _>(point.latitude)
            .bind::<sql_types::Double, _>(max_distance)
            .load::<GeoCandidateRow>(&mut conn)?;

        Ok(rows.into_iter().map(GeoCandidate::from).collect())
    }

    async fn find_nearby(
        &self,
        point: GeoPoint,
        max_distance: f64,
        subscription_type: Option<SubscriptionType>,
    ) -> Result<Vec<NearbyBusiness>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let query = format!(
            "SELECT * FROM ( \
                SELECT bp.id, bp.user_id, bp.business_name, bp.description, bp.tags, bp.slug, \
                    bp.longitude, bp.latitude, bp.state, bp.city, bp.postal_code, \
                    bp.street_address, bp.banner_image_url, bp.subscription_type, \
                    {DISTANCE_SQL} AS distance, \
                    u.full_name AS owner_full_name, u.email AS owner_email, \
                    u.profile_image_url AS owner_profile_image_url \
                FROM business_profiles bp \
                LEFT JOIN app_users u ON u.id = bp.user_id \
                WHERE bp.is_approved = TRUE \
                    AND ($4::text IS NULL OR bp.subscription_type = $4) \
            ) nearby \
            WHERE distance <= $3 \
            ORDER BY distance ASC"
        );

        let rows = sql_query(query)
            .bind::<sql_types::Double, _>(point.longitude)
            .bind::<sql_types::Double, _>(point.latitude)
            .bind::<sql_types::Double, _>(max_distance)
            .bind::<sql_types::Nullable<sql_types::Text>, _>(
                subscription_type.map(|tier| tier.as_str()),
            )
            .load::<NearbyBusinessRow>(&mut conn)?;

        Ok(rows.into_iter().map(NearbyBusiness::from).collect())
    }

    async fn find_by_id(&self, business_id: Uuid) -> Result<Option<BusinessProfileEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = business_profiles::table
            .find(business_id)
            .select(BusinessProfileEntity::as_select())
            .first::<BusinessProfileEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn list_paginated(
        &self,
        filter: AdminBusinessFilter,
    ) -> Result<(Vec<BusinessProfileEntity>, i64)> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let total_docs = admin_filter_query(&filter)
            .count()
            .get_result::<i64>(&mut conn)?;

        let businesses = admin_filter_query(&filter)
            .order(business_profiles::created_at.desc())
            .offset(filter.page.offset())
            .limit(filter.page.limit)
            .select(BusinessProfileEntity::as_select())
            .load::<BusinessProfileEntity>(&mut conn)?;

        Ok((businesses, total_docs))
    }

    async fn set_approval(
        &self,
        business_id: Uuid,
        is_approved: bool,
    ) -> Result<Option<BusinessProfileEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = diesel::update(business_profiles::table.find(business_id))
            .set((
                business_profiles::is_approved.eq(is_approved),
                business_profiles::updated_at.eq(Utc::now()),
            ))
            .returning(BusinessProfileEntity::as_select())
            .get_result::<BusinessProfileEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }
}
