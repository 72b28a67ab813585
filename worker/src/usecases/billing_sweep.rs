use std::sync::Arc;

use anyhow::{Result, anyhow};
use backend::usecases::subscription_sync::SubscriptionStateWriter;
use chrono::{DateTime, Utc};
use marketplace::domain::{
    entities::subscriptions::{SubscriptionEntity, UpsertSubscriptionEntity},
    repositories::{
        leases::LeaseRepository, payment_cards::PaymentCardRepository,
        payment_gateway::PaymentGateway, subscriptions::SubscriptionRepository,
    },
    value_objects::{
        enums::{expiry_reasons::ExpiryReason, subscription_statuses::SubscriptionStatus},
        payments::ChargeRequest,
        plans::PlanPricing,
    },
};
use tracing::{error, info, warn};
use uuid::Uuid;

pub const BILLING_SWEEP_LEASE: &str = "billing_sweep";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BillingSweepSummary {
    pub scanned: usize,
    pub renewed: usize,
    pub expired_no_card: usize,
    pub expired_charge_failed: usize,
    pub errors: usize,
    /// The lease went to another holder mid-tick and the rest was left for it.
    pub lease_lost: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SweepOutcome {
    Renewed,
    Expired(ExpiryReason),
}

pub struct BillingSweepUseCase<S, C, L, G>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    C: PaymentCardRepository + Send + Sync + 'static,
    L: LeaseRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    subscription_repo: Arc<S>,
    card_repo: Arc<C>,
    lease_repo: Arc<L>,
    payment_gateway: Arc<G>,
    state_writer: SubscriptionStateWriter<S>,
    pricing: PlanPricing,
    lease_ttl_secs: i64,
    holder: String,
}

impl<S, C, L, G> BillingSweepUseCase<S, C, L, G>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    C: PaymentCardRepository + Send + Sync + 'static,
    L: LeaseRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    pub fn new(
        subscription_repo: Arc<S>,
        card_repo: Arc<C>,
        lease_repo: Arc<L>,
        payment_gateway: Arc<G>,
        pricing: PlanPricing,
        lease_ttl_secs: i64,
    ) -> Self {
        let state_writer = SubscriptionStateWriter::new(Arc::clone(&subscription_repo));
        Self {
            subscription_repo,
            card_repo,
            lease_repo,
            payment_gateway,
            state_writer,
            pricing,
            lease_ttl_secs,
            holder: Uuid::new_v4().to_string(),
        }
    }

    /// One sweep. `None` when another process holds the sweep lease.
    pub async fn tick(&self, now: DateTime<Utc>) -> Result<Option<BillingSweepSummary>> {
        let acquired = self
            .lease_repo
            .try_acquire(BILLING_SWEEP_LEASE, &self.holder, self.lease_ttl_secs)
            .await?;
        if !acquired {
            info!(holder = %self.holder, "billing_sweep: lease held elsewhere, skipping tick");
            return Ok(None);
        }

        let result = self.sweep(now).await;

        if let Err(err) = self
            .lease_repo
            .release(BILLING_SWEEP_LEASE, &self.holder)
            .await
        {
            warn!(error = ?err, "billing_sweep: failed to release lease");
        }

        result.map(Some)
    }

    async fn sweep(&self, now: DateTime<Utc>) -> Result<BillingSweepSummary> {
        let due = self.subscription_repo.list_due(now).await.map_err(|err| {
            error!(db_error = ?err, "billing_sweep: failed to list due subscriptions");
            err
        })?;

        let mut summary = BillingSweepSummary {
            scanned: due.len(),
            ..Default::default()
        };

        for (position, subscription) in due.iter().enumerate() {
            if !self.extend_lease().await {
                warn!(
                    holder = %self.holder,
                    unprocessed = summary.scanned - position,
                    "billing_sweep: lease lost, abandoning the rest of this tick"
                );
                summary.lease_lost = true;
                break;
            }

            match self.settle(subscription, now).await {
                Ok(SweepOutcome::Renewed) => summary.renewed += 1,
                Ok(SweepOutcome::Expired(ExpiryReason::NoCard)) => summary.expired_no_card += 1,
                Ok(SweepOutcome::Expired(ExpiryReason::ChargeFailed)) => {
                    summary.expired_charge_failed += 1
                }
                Err(err) => {
                    error!(
                        user_id = %subscription.user_id,
                        subscription_id = %subscription.id,
                        error = ?err,
                        "billing_sweep: failed to settle subscription"
                    );
                    summary.errors += 1;
                }
            }
        }

        info!(
            scanned = summary.scanned,
            renewed = summary.renewed,
            expired_no_card = summary.expired_no_card,
            expired_charge_failed = summary.expired_charge_failed,
            errors = summary.errors,
            lease_lost = summary.lease_lost,
            "billing_sweep: completed"
        );
        Ok(summary)
    }

    /// Pushes the lease expiry out again before money moves.
    async fn extend_lease(&self) -> bool {
        match self
            .lease_repo
            .try_acquire(BILLING_SWEEP_LEASE, &self.holder, self.lease_ttl_secs)
            .await
        {
            Ok(held) => held,
            Err(err) => {
                error!(db_error = ?err, "billing_sweep: failed to extend lease");
                false
            }
        }
    }

    async fn settle(
        &self,
        subscription: &SubscriptionEntity,
        now: DateTime<Utc>,
    ) -> Result<SweepOutcome> {
        let user_id = subscription.user_id;

        let card = match subscription.payment_card_id {
            None => None,
            Some(card_id) => match self.card_repo.find_by_id(card_id).await {
                Ok(card) => card,
                Err(err) => {
                    warn!(%user_id, %card_id, error = ?err, "billing_sweep: card lookup failed");
                    return self
                        .expire(subscription, ExpiryReason::ChargeFailed)
                        .await;
                }
            },
        };
        let Some(card) = card else {
            return self.expire(subscription, ExpiryReason::NoCard).await;
        };

        let charge = self
            .payment_gateway
            .create_charge(ChargeRequest {
                amount_minor: self.pricing.renewal_price_minor,
                currency: self.pricing.currency.clone(),
                customer_id: card.stripe_customer_id.clone(),
                payment_method_id: card.stripe_payment_method_id.clone(),
                description: Some("subscription renewal".to_string()),
            })
            .await;

        let charge = match charge {
            Ok(charge) if charge.is_succeeded() => charge,
            Ok(charge) => {
                warn!(
                    %user_id,
                    charge_id = %charge.id,
                    status = %charge.status,
                    "billing_sweep: renewal charge declined"
                );
                return self.expire(subscription, ExpiryReason::ChargeFailed).await;
            }
            Err(err) => {
                warn!(%user_id, error = ?err, "billing_sweep: renewal charge failed");
                return self.expire(subscription, ExpiryReason::ChargeFailed).await;
            }
        };

        let (start, expiry) = self.pricing.period_from(now);
        let mut renewed = UpsertSubscriptionEntity::from(subscription);
        renewed.subscription_status = SubscriptionStatus::Standard.as_str().to_string();
        renewed.previous_subscription_status = Some(subscription.subscription_status.clone());
        renewed.subscription_start_date = Some(start);
        renewed.subscription_expiry_date = Some(expiry);
        renewed.expiry_reason = None;
        renewed.payment_card_id = Some(card.id);
        renewed.subscription_method_id = Some(charge.id.clone());

        self.state_writer.persist(renewed).await.map_err(|err| {
            error!(
                %user_id,
                charge_id = %charge.id,
                reconciliation_required = true,
                db_error = ?err,
                "billing_sweep: local write failed after a successful renewal charge"
            );
            anyhow!("renewal of {user_id} not persisted: {err}")
        })?;

        info!(%user_id, charge_id = %charge.id, "billing_sweep: subscription renewed");
        Ok(SweepOutcome::Renewed)
    }

    async fn expire(
        &self,
        subscription: &SubscriptionEntity,
        reason: ExpiryReason,
    ) -> Result<SweepOutcome> {
        let mut expired = UpsertSubscriptionEntity::from(subscription);
        expired.subscription_status = SubscriptionStatus::Expired.as_str().to_string();
        expired.previous_subscription_status = Some(subscription.subscription_status.clone());
        expired.subscription_start_date = None;
        expired.subscription_expiry_date = None;
        expired.expiry_reason = Some(reason.code().to_string());
        expired.payment_card_id = None;

        self.state_writer.persist(expired).await?;

        info!(
            user_id = %subscription.user_id,
            expiry_reason = reason.code(),
            "billing_sweep: subscription expired"
        );
        Ok(SweepOutcome::Expired(reason))
    }
}
