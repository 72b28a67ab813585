use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State, rejection::QueryRejection},
    response::IntoResponse,
    routing::get,
};
use marketplace::{
    domain::{
        repositories::{
            business_profiles::BusinessProfileRepository, reviews::ReviewRepository,
            services::ServiceRepository,
        },
        value_objects::{
            enums::ranking_policies::ListingPolicy,
            service_listing::{ServiceListingQuery, price_to_minor},
        },
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{
            business_profiles::BusinessProfilePostgres, reviews::ReviewPostgres,
            services::ServicePostgres,
        },
    },
};
use serde::Deserialize;
use tracing::info;

use super::{non_blank, parse_page, parse_point};
use crate::{
    axum_http::error_responses::{AppError, ok},
    config::config_model::DotEnvyConfig,
    usecases::{geo_ranking::GeoRankingEngine, service_listing::ServiceListingUseCase},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicesQuery {
    policy: Option<i32>,
    longitude: Option<f64>,
    latitude: Option<f64>,
    price_max: Option<f64>,
    page: Option<i64>,
    limit: Option<i64>,
    search: Option<String>,
}

pub struct ServicesState<B, R, S>
where
    B: BusinessProfileRepository + Send + Sync + 'static,
    R: ReviewRepository + Send + Sync + 'static,
    S: ServiceRepository + Send + Sync + 'static,
{
    ranking: GeoRankingEngine<B, R>,
    listing: ServiceListingUseCase<S, R>,
}

pub fn routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Router {
    let business_repository = Arc::new(BusinessProfilePostgres::new(Arc::clone(&db_pool)));
    let review_repository = Arc::new(ReviewPostgres::new(Arc::clone(&db_pool)));
    let service_repository = Arc::new(ServicePostgres::new(Arc::clone(&db_pool)));

    let state = ServicesState {
        ranking: GeoRankingEngine::new(
            business_repository,
            Arc::clone(&review_repository),
            config.discovery.ranking_max_distance_meters,
        ),
        listing: ServiceListingUseCase::new(service_repository, review_repository),
    };

    Router::new()
        .route(
            "/",
            get(list_services::<BusinessProfilePostgres, ReviewPostgres, ServicePostgres>),
        )
        .with_state(Arc::new(state))
}

fn parse_policy(policy: Option<i32>) -> Result<ListingPolicy, AppError> {
    match policy {
        None => Ok(ListingPolicy::Recent),
        Some(code) => ListingPolicy::from_code(code)
            .ok_or_else(|| AppError::bad_request("policy must be 0, 1 or 2")),
    }
}

pub async fn list_services<B, R, S>(
    State(state): State<Arc<ServicesState<B, R, S>>>,
    query: Result<Query<ServicesQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError>
where
    B: BusinessProfileRepository + Send + Sync + 'static,
    R: ReviewRepository + Send + Sync + 'static,
    S: ServiceRepository + Send + Sync + 'static,
{
    let Query(query) = query?;
    let policy = parse_policy(query.policy)?;
    let page = parse_page(query.page, query.limit)?;
    let price_max_minor = match query.price_max {
        None => None,
        Some(price) => Some(
            price_to_minor(price)
                .ok_or_else(|| AppError::bad_request("priceMax must be a non-negative number"))?,
        ),
    };

    let business_ids = match policy.nearby_policy() {
        Some(nearby_policy) => {
            let point = parse_point(query.longitude, query.latitude)?;
            state.ranking.rank_nearby(point, nearby_policy).await?
        }
        None => Vec::new(),
    };
    info!(%policy, ranked = business_ids.len(), "services: listing request received");

    let listing = state
        .listing
        .list_services(
            business_ids,
            ServiceListingQuery {
                policy,
                price_max_minor,
                page,
                search_text: non_blank(query.search),
            },
        )
        .await?;
    Ok(ok(listing))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_defaults_to_recent() {
        assert_eq!(parse_policy(None).unwrap(), ListingPolicy::Recent);
        assert_eq!(parse_policy(Some(0)).unwrap(), ListingPolicy::BestRating);
        assert_eq!(parse_policy(Some(1)).unwrap(), ListingPolicy::Nearest);
        assert!(parse_policy(Some(3)).is_err());
    }
}
