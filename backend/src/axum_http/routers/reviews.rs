use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::patch,
};
use marketplace::{
    domain::{
        repositories::{business_profiles::BusinessProfileRepository, reviews::ReviewRepository},
        value_objects::reviews::UpdateReviewModel,
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{business_profiles::BusinessProfilePostgres, reviews::ReviewPostgres},
    },
};
use tracing::info;
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    axum_http::error_responses::{AppError, ok},
    usecases::reviews::ReviewUseCase,
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let review_repository = ReviewPostgres::new(Arc::clone(&db_pool));
    let business_repository = BusinessProfilePostgres::new(Arc::clone(&db_pool));
    let usecase = ReviewUseCase::new(Arc::new(review_repository), Arc::new(business_repository));

    Router::new()
        .route(
            "/:review_id",
            patch(update_review::<ReviewPostgres, BusinessProfilePostgres>)
                .delete(delete_review::<ReviewPostgres, BusinessProfilePostgres>),
        )
        .with_state(Arc::new(usecase))
}

pub async fn update_review<R, B>(
    State(usecase): State<Arc<ReviewUseCase<R, B>>>,
    AuthUser { user_id, .. }: AuthUser,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<UpdateReviewModel>, JsonRejection>,
) -> Result<impl IntoResponse, AppError>
where
    R: ReviewRepository + Send + Sync + 'static,
    B: BusinessProfileRepository + Send + Sync + 'static,
{
    let Path(review_id) = path?;
    let Json(model) = body?;
    info!(%user_id, %review_id, "reviews: update request received");

    let review = usecase.update_review(user_id, review_id, model).await?;
    Ok(ok(review))
}

pub async fn delete_review<R, B>(
    State(usecase): State<Arc<ReviewUseCase<R, B>>>,
    AuthUser { user_id, .. }: AuthUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, AppError>
where
    R: ReviewRepository + Send + Sync + 'static,
    B: BusinessProfileRepository + Send + Sync + 'static,
{
    let Path(review_id) = path?;
    info!(%user_id, %review_id, "reviews: delete request received");

    usecase.delete_review(user_id, review_id).await?;
    Ok((StatusCode::OK, ok(serde_json::json!({ "id": review_id }))))
}
