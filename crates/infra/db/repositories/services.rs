use anyhow::Result;
use async_trait::async_trait;
use diesel::{
    dsl::{InnerJoin, IntoBoxed},
    pg::Pg,
    prelude::*,
};
use std::sync::Arc;

use crate::{
    domain,
    infra::db::{
        postgres::{
            postgres_connection::PgPoolSquad,
            schema::{business_profiles, services},
        },
        repositories::business_profiles::escape_like,
    },
};
use domain::{
    entities::services::ServiceEntity,
    repositories::services::ServiceRepository,
    value_objects::{
        enums::subscription_types::SubscriptionType,
        service_listing::{ServiceCandidate, ServiceCandidateFilter},
    },
};

pub struct ServicePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ServicePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

type CandidateQuery = IntoBoxed<'static, InnerJoin<services::table, business_profiles::table>, Pg>;

/// Active services of approved businesses. Unapproved businesses never list,
/// whichever policy built the filter.
fn candidate_query(filter: &ServiceCandidateFilter) -> CandidateQuery {
    let mut query = services::table
        .inner_join(business_profiles::table)
        .filter(services::is_active.eq(true))
        .filter(business_profiles::is_approved.eq(true))
        .into_boxed();

    if let Some(business_ids) = filter.business_ids.clone() {
        query = query.filter(services::business_id.eq_any(business_ids));
    }
    if let Some(price_max) = filter.price_max_minor {
        query = query.filter(services::price_minor.le(price_max));
    }
    if let Some(search) = filter.search_text.as_deref() {
        let pattern = format!("%{}%", escape_like(search));
        query = query.filter(
            services::name
                .ilike(pattern.clone())
                .or(services::description.ilike(pattern)),
        );
    }
    query
}

#[async_trait]
impl ServiceRepository for ServicePostgres {
    async fn list_active_candidates(
        &self,
        filter: ServiceCandidateFilter,
    ) -> Result<Vec<ServiceCandidate>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let query = candidate_query(&filter);

        let rows = query
            .select((
                ServiceEntity::as_select(),
                business_profiles::business_name,
                business_profiles::slug,
                business_profiles::subscription_type,
            ))
            .load::<(ServiceEntity, String, String, String)>(&mut conn)?;

        let candidates = rows
            .into_iter()
            .map(|(service, business_name, business_slug, tier)| ServiceCandidate {
                id: service.id,
                business_id: service.business_id,
                name: service.name,
                description: service.description,
                price_minor: service.price_minor,
                created_at: service.created_at,
                business_name,
                business_slug,
                business_subscription_type: SubscriptionType::from_str(&tier).unwrap_or_default(),
            })
            .collect();

        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::debug_query;

    fn sql_for(filter: &ServiceCandidateFilter) -> String {
        debug_query::<Pg, _>(&candidate_query(filter)).to_string()
    }

    #[test]
    fn recent_candidates_exclude_unapproved_businesses() {
        let sql = sql_for(&ServiceCandidateFilter::default());

        assert!(sql.contains("\"business_profiles\".\"is_approved\" = $"), "{sql}");
        assert!(sql.contains("\"services\".\"is_active\" = $"), "{sql}");
        assert!(!sql.contains("\"services\".\"business_id\" = ANY"), "{sql}");
    }

    #[test]
    fn ranked_candidates_are_scoped_to_business_ids() {
        let sql = sql_for(&ServiceCandidateFilter {
            business_ids: Some(vec![uuid::Uuid::new_v4()]),
            price_max_minor: Some(5_000),
            search_text: Some("cut".to_string()),
        });

        assert!(sql.contains("\"business_profiles\".\"is_approved\" = $"), "{sql}");
        assert!(sql.contains("\"services\".\"business_id\" = ANY"), "{sql}");
        assert!(sql.contains("\"services\".\"price_minor\" <= $"), "{sql}");
        assert!(sql.contains("ILIKE"), "{sql}");
    }
}
