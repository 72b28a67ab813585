use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    response::IntoResponse,
    routing::get,
};
use marketplace::{
    domain::{
        repositories::{business_profiles::BusinessProfileRepository, reviews::ReviewRepository},
        value_objects::{
            business_discovery::{DiscoverySort, NearbyBusinessQuery},
            enums::subscription_types::SubscriptionType,
            geo::validate_radius,
            reviews::CreateReviewModel,
        },
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{business_profiles::BusinessProfilePostgres, reviews::ReviewPostgres},
    },
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::{non_blank, parse_point};
use crate::{
    auth::AuthUser,
    axum_http::error_responses::{AppError, created, ok},
    config::config_model::DotEnvyConfig,
    usecases::{business_discovery::BusinessDiscoveryUseCase, reviews::ReviewUseCase},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyQuery {
    longitude: Option<f64>,
    latitude: Option<f64>,
    max_distance: Option<f64>,
    search: Option<String>,
    sort_by: Option<String>,
    subscription_type: Option<String>,
}

pub struct DiscoveryState<B, R>
where
    B: BusinessProfileRepository + Send + Sync + 'static,
    R: ReviewRepository + Send + Sync + 'static,
{
    usecase: BusinessDiscoveryUseCase<B, R>,
    default_distance: f64,
}

pub fn routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Router {
    let business_repository = Arc::new(BusinessProfilePostgres::new(Arc::clone(&db_pool)));
    let review_repository = Arc::new(ReviewPostgres::new(Arc::clone(&db_pool)));

    let discovery_state = DiscoveryState {
        usecase: BusinessDiscoveryUseCase::new(
            Arc::clone(&business_repository),
            Arc::clone(&review_repository),
        ),
        default_distance: config.discovery.default_distance_meters,
    };
    let review_usecase = ReviewUseCase::new(review_repository, business_repository);

    let discovery = Router::new()
        .route(
            "/nearby",
            get(find_nearby::<BusinessProfilePostgres, ReviewPostgres>),
        )
        .with_state(Arc::new(discovery_state));

    let reviews = Router::new()
        .route(
            "/:business_id/reviews",
            get(list_reviews::<ReviewPostgres, BusinessProfilePostgres>)
                .post(create_review::<ReviewPostgres, BusinessProfilePostgres>),
        )
        .with_state(Arc::new(review_usecase));

    discovery.merge(reviews)
}

fn build_nearby_query(query: NearbyQuery, default_distance: f64) -> Result<NearbyBusinessQuery, AppError> {
    let point = parse_point(query.longitude, query.latitude)?;
    let max_distance = validate_radius(query.max_distance.unwrap_or(default_distance))
        .map_err(|err| AppError::bad_request(err.to_string()))?;

    let sort_by = match query.sort_by.as_deref() {
        None => DiscoverySort::default(),
        Some(raw) => DiscoverySort::from_str(raw)
            .ok_or_else(|| AppError::bad_request("sortBy must be 'distance' or 'rating'"))?,
    };

    let subscription_type = match non_blank(query.subscription_type) {
        None => None,
        Some(raw) => Some(SubscriptionType::from_str(&raw).ok_or_else(|| {
            AppError::bad_request("subscriptionType must be 'free', 'standard' or 'sponsored'")
        })?),
    };

    Ok(NearbyBusinessQuery {
        point,
        max_distance,
        search_text: non_blank(query.search),
        sort_by,
        subscription_type,
    })
}

pub async fn find_nearby<B, R>(
    State(state): State<Arc<DiscoveryState<B, R>>>,
    query: Result<Query<NearbyQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError>
where
    B: BusinessProfileRepository + Send + Sync + 'static,
    R: ReviewRepository + Send + Sync + 'static,
{
    let Query(query) = query?;
    let query = build_nearby_query(query, state.default_distance)?;
    info!(
        longitude = query.point.longitude,
        latitude = query.point.latitude,
        max_distance = query.max_distance,
        "businesses: nearby request received"
    );

    let businesses = state.usecase.find_nearby(query).await?;
    Ok(ok(businesses))
}

pub async fn list_reviews<R, B>(
    State(usecase): State<Arc<ReviewUseCase<R, B>>>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, AppError>
where
    R: ReviewRepository + Send + Sync + 'static,
    B: BusinessProfileRepository + Send + Sync + 'static,
{
    let Path(business_id) = path?;
    let reviews = usecase.list_reviews(business_id).await?;
    Ok(ok(reviews))
}

pub async fn create_review<R, B>(
    State(usecase): State<Arc<ReviewUseCase<R, B>>>,
    AuthUser { user_id, .. }: AuthUser,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<CreateReviewModel>, JsonRejection>,
) -> Result<impl IntoResponse, AppError>
where
    R: ReviewRepository + Send + Sync + 'static,
    B: BusinessProfileRepository + Send + Sync + 'static,
{
    let Path(business_id) = path?;
    let Json(model) = body?;
    info!(%user_id, %business_id, "businesses: review submitted");

    let review = usecase.create_review(user_id, business_id, model).await?;
    Ok(created(review))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nearby(sort_by: Option<&str>, subscription_type: Option<&str>) -> NearbyQuery {
        NearbyQuery {
            longitude: Some(100.5),
            latitude: Some(13.7),
            max_distance: None,
            search: Some("  ".to_string()),
            sort_by: sort_by.map(str::to_string),
            subscription_type: subscription_type.map(str::to_string),
        }
    }

    #[test]
    fn applies_defaults() {
        let query = build_nearby_query(nearby(None, None), 100_000.0).unwrap();
        assert_eq!(query.max_distance, 100_000.0);
        assert_eq!(query.sort_by, DiscoverySort::Distance);
        assert_eq!(query.search_text, None);
        assert_eq!(query.subscription_type, None);
    }

    #[test]
    fn rejects_unknown_sort_and_tier() {
        assert!(build_nearby_query(nearby(Some("price"), None), 100_000.0).is_err());
        assert!(build_nearby_query(nearby(None, Some("gold")), 100_000.0).is_err());

        let query = build_nearby_query(nearby(Some("rating"), Some("sponsored")), 100_000.0).unwrap();
        assert_eq!(query.sort_by, DiscoverySort::Rating);
        assert_eq!(query.subscription_type, Some(SubscriptionType::Sponsored));
    }

    #[test]
    fn rejects_non_positive_radius() {
        let mut query = nearby(None, None);
        query.max_distance = Some(0.0);
        assert!(build_nearby_query(query, 100_000.0).is_err());
    }
}
