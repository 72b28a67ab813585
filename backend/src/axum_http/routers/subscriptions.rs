use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    response::IntoResponse,
    routing::{get, post, put},
};
use marketplace::{
    domain::{
        repositories::{
            leases::LeaseRepository, payment_cards::PaymentCardRepository,
            payment_gateway::PaymentGateway, subscriptions::SubscriptionRepository,
        },
        value_objects::subscriptions::{
            ChangePlanModel, SaveCardAndSubscribeModel, UpdateCardModel,
        },
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{
            leases::LeasePostgres, payment_cards::PaymentCardPostgres,
            subscriptions::SubscriptionPostgres,
        },
    },
    payments::stripe_client::StripeClient,
};
use tracing::info;

use crate::{
    auth::AuthUser,
    axum_http::error_responses::{AppError, created, ok},
    config::config_model::DotEnvyConfig,
    usecases::subscriptions::SubscriptionUseCase,
};

type StripeSubscriptionUseCase =
    SubscriptionUseCase<SubscriptionPostgres, PaymentCardPostgres, LeasePostgres, StripeClient>;

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    config: Arc<DotEnvyConfig>,
    stripe_client: Arc<StripeClient>,
) -> Router {
    let subscription_repository = SubscriptionPostgres::new(Arc::clone(&db_pool));
    let card_repository = PaymentCardPostgres::new(Arc::clone(&db_pool));
    let lease_repository = LeasePostgres::new(Arc::clone(&db_pool));

    let usecase: StripeSubscriptionUseCase = SubscriptionUseCase::new(
        Arc::new(subscription_repository),
        Arc::new(card_repository),
        Arc::new(lease_repository),
        stripe_client,
        config.pricing.clone(),
    );

    Router::new()
        .route(
            "/",
            post(save_card_and_subscribe::<SubscriptionPostgres, PaymentCardPostgres, LeasePostgres, StripeClient>),
        )
        .route(
            "/current",
            get(current_subscription::<SubscriptionPostgres, PaymentCardPostgres, LeasePostgres, StripeClient>),
        )
        .route(
            "/plan",
            put(change_plan::<SubscriptionPostgres, PaymentCardPostgres, LeasePostgres, StripeClient>),
        )
        .route(
            "/card",
            put(update_card::<SubscriptionPostgres, PaymentCardPostgres, LeasePostgres, StripeClient>)
                .delete(remove_card::<SubscriptionPostgres, PaymentCardPostgres, LeasePostgres, StripeClient>),
        )
        .with_state(Arc::new(usecase))
}

pub async fn current_subscription<S, C, L, G>(
    State(usecase): State<Arc<SubscriptionUseCase<S, C, L, G>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> Result<impl IntoResponse, AppError>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    C: PaymentCardRepository + Send + Sync + 'static,
    L: LeaseRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    let details = usecase.get_subscription(user_id).await?;
    Ok(ok(details))
}

pub async fn save_card_and_subscribe<S, C, L, G>(
    State(usecase): State<Arc<SubscriptionUseCase<S, C, L, G>>>,
    AuthUser { user_id, .. }: AuthUser,
    body: Result<Json<SaveCardAndSubscribeModel>, JsonRejection>,
) -> Result<impl IntoResponse, AppError>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    C: PaymentCardRepository + Send + Sync + 'static,
    L: LeaseRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    let Json(model) = body?;
    info!(%user_id, plan_type = model.plan_type, "subscriptions: subscribe request received");

    let details = usecase.save_card_and_subscribe(user_id, model).await?;
    Ok(created(details))
}

pub async fn change_plan<S, C, L, G>(
    State(usecase): State<Arc<SubscriptionUseCase<S, C, L, G>>>,
    AuthUser { user_id, .. }: AuthUser,
    body: Result<Json<ChangePlanModel>, JsonRejection>,
) -> Result<impl IntoResponse, AppError>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    C: PaymentCardRepository + Send + Sync + 'static,
    L: LeaseRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    let Json(model) = body?;
    info!(%user_id, plan_type = model.plan_type, "subscriptions: plan change request received");

    let details = usecase.change_plan(user_id, model).await?;
    Ok(ok(details))
}

pub async fn update_card<S, C, L, G>(
    State(usecase): State<Arc<SubscriptionUseCase<S, C, L, G>>>,
    AuthUser { user_id, .. }: AuthUser,
    body: Result<Json<UpdateCardModel>, JsonRejection>,
) -> Result<impl IntoResponse, AppError>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    C: PaymentCardRepository + Send + Sync + 'static,
    L: LeaseRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    let Json(model) = body?;
    info!(%user_id, "subscriptions: card update request received");

    let details = usecase.update_card(user_id, model).await?;
    Ok(ok(details))
}

pub async fn remove_card<S, C, L, G>(
    State(usecase): State<Arc<SubscriptionUseCase<S, C, L, G>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> Result<impl IntoResponse, AppError>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    C: PaymentCardRepository + Send + Sync + 'static,
    L: LeaseRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    info!(%user_id, "subscriptions: card removal request received");

    let details = usecase.remove_card(user_id).await?;
    Ok(ok(details))
}
