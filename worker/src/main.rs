use anyhow::Result;
use backend::axum_http::http_serve::shutdown_signal;
use marketplace::{
    infra::db::{
        postgres::postgres_connection,
        repositories::{
            leases::LeasePostgres, payment_cards::PaymentCardPostgres,
            subscriptions::SubscriptionPostgres,
        },
    },
    payments::stripe_client::StripeClient,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};
use worker::{billing_sweep, config, usecases::billing_sweep::BillingSweepUseCase};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        error!("Worker exited with error: {:?}", error);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    marketplace::observability::init_observability("worker")?;

    let dotenvy_env = config::config_loader::load()?;
    info!("ENV has been loaded");

    let postgres_pool = postgres_connection::establish_connection(
        &dotenvy_env.database.url,
        &dotenvy_env.database.pool_settings(),
    )?;
    info!("Postgres connection has been established");

    let db_pool_arc = Arc::new(postgres_pool);
    let stripe_client = StripeClient::new(
        dotenvy_env.stripe.secret_key.clone(),
        dotenvy_env.stripe.timeout(),
    )?;

    let billing_sweep_usecase = Arc::new(BillingSweepUseCase::new(
        Arc::new(SubscriptionPostgres::new(Arc::clone(&db_pool_arc))),
        Arc::new(PaymentCardPostgres::new(Arc::clone(&db_pool_arc))),
        Arc::new(LeasePostgres::new(Arc::clone(&db_pool_arc))),
        Arc::new(stripe_client),
        dotenvy_env.pricing.clone(),
        dotenvy_env.billing_sweep.lease_ttl_secs,
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut billing_sweep_loop = tokio::spawn(billing_sweep::worker::run(
        billing_sweep_usecase,
        dotenvy_env.billing_sweep.interval(),
        shutdown_rx,
    ));

    tokio::select! {
        result = &mut billing_sweep_loop => return result?,
        _ = shutdown_signal() => info!("Waiting for the current billing sweep tick to finish"),
    };

    shutdown_tx.send(true).ok();
    billing_sweep_loop.await??;
    info!("Worker stopped");
    Ok(())
}
