use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    response::IntoResponse,
    routing::{get, patch},
};
use marketplace::{
    domain::{
        repositories::{
            bookings::BookingRepository, business_profiles::BusinessProfileRepository,
            reviews::ReviewRepository,
        },
        value_objects::{
            bookings::BookingFilter, business_discovery::AdminBusinessFilter,
            enums::booking_statuses::BookingStatus,
        },
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{
            bookings::BookingPostgres, business_profiles::BusinessProfilePostgres,
            reviews::ReviewPostgres,
        },
    },
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::{non_blank, parse_page};
use crate::{
    auth::AuthUser,
    axum_http::error_responses::{AppError, ok},
    usecases::{admin::BookingAdminUseCase, business_discovery::BusinessDiscoveryUseCase},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessListQuery {
    page: Option<i64>,
    limit: Option<i64>,
    is_approved: Option<bool>,
    search: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalModel {
    is_approved: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingListQuery {
    page: Option<i64>,
    limit: Option<i64>,
    booking_status: Option<i16>,
}

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let business_repository = BusinessProfilePostgres::new(Arc::clone(&db_pool));
    let review_repository = ReviewPostgres::new(Arc::clone(&db_pool));
    let booking_repository = BookingPostgres::new(Arc::clone(&db_pool));

    let discovery_usecase =
        BusinessDiscoveryUseCase::new(Arc::new(business_repository), Arc::new(review_repository));
    let booking_usecase = BookingAdminUseCase::new(Arc::new(booking_repository));

    let businesses = Router::new()
        .route(
            "/businesses",
            get(list_businesses::<BusinessProfilePostgres, ReviewPostgres>),
        )
        .route(
            "/businesses/:business_id/approval",
            patch(set_approval::<BusinessProfilePostgres, ReviewPostgres>),
        )
        .with_state(Arc::new(discovery_usecase));

    let bookings = Router::new()
        .route("/bookings", get(list_bookings::<BookingPostgres>))
        .with_state(Arc::new(booking_usecase));

    businesses.merge(bookings)
}

pub async fn list_businesses<B, R>(
    State(usecase): State<Arc<BusinessDiscoveryUseCase<B, R>>>,
    auth: AuthUser,
    query: Result<Query<BusinessListQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError>
where
    B: BusinessProfileRepository + Send + Sync + 'static,
    R: ReviewRepository + Send + Sync + 'static,
{
    auth.require_admin()?;
    let Query(query) = query?;

    let filter = AdminBusinessFilter {
        page: parse_page(query.page, query.limit)?,
        is_approved: query.is_approved,
        search_text: non_blank(query.search),
    };
    info!(user_id = %auth.user_id, ?filter, "admin: business listing requested");

    let listing = usecase.list_businesses(filter).await?;
    Ok(ok(listing))
}

pub async fn set_approval<B, R>(
    State(usecase): State<Arc<BusinessDiscoveryUseCase<B, R>>>,
    auth: AuthUser,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<ApprovalModel>, JsonRejection>,
) -> Result<impl IntoResponse, AppError>
where
    B: BusinessProfileRepository + Send + Sync + 'static,
    R: ReviewRepository + Send + Sync + 'static,
{
    auth.require_admin()?;
    let Path(business_id) = path?;
    let Json(model) = body?;
    info!(
        user_id = %auth.user_id,
        %business_id,
        is_approved = model.is_approved,
        "admin: approval change requested"
    );

    let business = usecase.set_approval(business_id, model.is_approved).await?;
    Ok(ok(business))
}

pub async fn list_bookings<K>(
    State(usecase): State<Arc<BookingAdminUseCase<K>>>,
    auth: AuthUser,
    query: Result<Query<BookingListQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError>
where
    K: BookingRepository + Send + Sync + 'static,
{
    auth.require_admin()?;
    let Query(query) = query?;

    let booking_status = match query.booking_status {
        None => None,
        Some(code) => Some(
            BookingStatus::from_code(code)
                .ok_or_else(|| AppError::bad_request("bookingStatus must be 0, 1, 2 or 3"))?,
        ),
    };
    let filter = BookingFilter {
        page: parse_page(query.page, query.limit)?,
        booking_status,
    };

    let listing = usecase.list_bookings(filter).await?;
    Ok(ok(listing))
}
