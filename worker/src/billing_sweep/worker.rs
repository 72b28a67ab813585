use std::{sync::Arc, time::Duration};

use anyhow::Result;
use chrono::Utc;
use marketplace::domain::repositories::{
    leases::LeaseRepository, payment_cards::PaymentCardRepository,
    payment_gateway::PaymentGateway, subscriptions::SubscriptionRepository,
};
use tokio::sync::watch;
use tracing::{error, info};

use crate::usecases::billing_sweep::BillingSweepUseCase;

/// Ticks until `shutdown` flips to `true`. A tick in flight always finishes,
/// so a shutdown never lands between a charge and its local write.
pub async fn run<S, C, L, G>(
    usecase: Arc<BillingSweepUseCase<S, C, L, G>>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    C: PaymentCardRepository + Send + Sync + 'static,
    L: LeaseRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    info!(interval_secs = interval.as_secs(), "billing_sweep: starting worker loop");
    while !*shutdown.borrow() {
        match usecase.tick(Utc::now()).await {
            Ok(Some(summary)) => {
                if summary.errors > 0 {
                    error!(
                        errors = summary.errors,
                        scanned = summary.scanned,
                        "billing_sweep: tick finished with errors"
                    );
                }
            }
            Ok(None) => {}
            Err(e) => {
                error!(error = ?e, "billing_sweep: tick failed");
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    info!("billing_sweep: worker loop stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use marketplace::domain::{
        repositories::{
            leases::MockLeaseRepository, payment_cards::MockPaymentCardRepository,
            payment_gateway::MockPaymentGateway, subscriptions::MockSubscriptionRepository,
        },
        value_objects::plans::PlanPricing,
    };

    #[tokio::test]
    async fn shutdown_stops_the_loop_after_the_current_tick() {
        let (ticked_tx, mut ticked_rx) = tokio::sync::mpsc::unbounded_channel::<()>();
        let mut lease_repo = MockLeaseRepository::new();
        lease_repo
            .expect_try_acquire()
            .times(1)
            .returning(move |_, _, _| {
                ticked_tx.send(()).ok();
                Ok(false)
            });

        let usecase = Arc::new(BillingSweepUseCase::new(
            Arc::new(MockSubscriptionRepository::new()),
            Arc::new(MockPaymentCardRepository::new()),
            Arc::new(lease_repo),
            Arc::new(MockPaymentGateway::new()),
            PlanPricing::default(),
            900,
        ));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let worker = tokio::spawn(run(usecase, Duration::from_secs(3600), shutdown_rx));

        ticked_rx.recv().await.unwrap();
        shutdown_tx.send(true).unwrap();

        let stopped = tokio::time::timeout(Duration::from_secs(5), worker)
            .await
            .expect("worker loop ignored shutdown");
        assert!(stopped.unwrap().is_ok());
    }
}
