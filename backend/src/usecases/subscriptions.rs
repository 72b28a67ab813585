use std::sync::Arc;

use anyhow::anyhow;
use chrono::Utc;
use marketplace::domain::{
    entities::{
        payment_cards::{PaymentCardEntity, UpsertPaymentCardEntity},
        subscriptions::{SubscriptionEntity, UpsertSubscriptionEntity},
    },
    repositories::{
        leases::LeaseRepository, payment_cards::PaymentCardRepository,
        payment_gateway::PaymentGateway, subscriptions::SubscriptionRepository,
    },
    value_objects::{
        enums::subscription_statuses::SubscriptionStatus,
        payments::{ChargeOutcome, ChargeRequest},
        plans::{PlanPricing, plan_type_to_status},
        subscriptions::{
            ChangePlanModel, SUBSCRIPTION_METHOD_STRIPE, SaveCardAndSubscribeModel,
            SubscriptionDetailsDto, UpdateCardModel,
        },
    },
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::subscription_sync::SubscriptionStateWriter;

pub const USER_LEASE_TTL_SECS: i64 = 60;

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("{0}")]
    Validation(String),
    #[error("no payment card on file")]
    NoCardOnFile,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("already subscribed, change the plan instead")]
    AlreadySubscribed,
    #[error("another subscription change is in progress")]
    MutationInProgress,
    #[error("payment was declined")]
    PaymentDeclined,
    #[error("payment processor failure: {0}")]
    ExternalService(anyhow::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl SubscriptionError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            SubscriptionError::Validation(_) | SubscriptionError::NoCardOnFile => {
                StatusCode::BAD_REQUEST
            }
            SubscriptionError::NotFound(_) => StatusCode::NOT_FOUND,
            SubscriptionError::AlreadySubscribed | SubscriptionError::MutationInProgress => {
                StatusCode::CONFLICT
            }
            SubscriptionError::PaymentDeclined => StatusCode::PAYMENT_REQUIRED,
            SubscriptionError::ExternalService(_) => StatusCode::BAD_GATEWAY,
            SubscriptionError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, SubscriptionError>;

/// Customer and payment method pair the processor charges.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CardRef {
    customer_id: String,
    payment_method_id: String,
}

impl From<&PaymentCardEntity> for CardRef {
    fn from(card: &PaymentCardEntity) -> Self {
        Self {
            customer_id: card.stripe_customer_id.clone(),
            payment_method_id: card.stripe_payment_method_id.clone(),
        }
    }
}

/// Applies the card reuse rule to the optional ids of a request.
fn resolve_card_ref(
    customer_id: Option<String>,
    payment_method_id: Option<String>,
    stored: Option<&PaymentCardEntity>,
) -> UseCaseResult<Option<CardRef>> {
    let customer_id = customer_id.filter(|id| !id.trim().is_empty());
    let payment_method_id = payment_method_id.filter(|id| !id.trim().is_empty());

    match (customer_id, payment_method_id) {
        (None, None) => Ok(stored.map(CardRef::from)),
        (Some(_), None) => Err(SubscriptionError::Validation(
            "stripePaymentMethodId is required when stripeCustomerId is given".to_string(),
        )),
        (None, Some(payment_method_id)) => {
            let customer_id = stored
                .map(|card| card.stripe_customer_id.clone())
                .ok_or_else(|| {
                    SubscriptionError::Validation(
                        "payment method has no resolvable customer".to_string(),
                    )
                })?;
            Ok(Some(CardRef {
                customer_id,
                payment_method_id,
            }))
        }
        (Some(customer_id), Some(payment_method_id)) => Ok(Some(CardRef {
            customer_id,
            payment_method_id,
        })),
    }
}

fn parse_status(subscription: &SubscriptionEntity) -> UseCaseResult<SubscriptionStatus> {
    SubscriptionStatus::from_str(&subscription.subscription_status).ok_or_else(|| {
        SubscriptionError::Internal(anyhow!(
            "subscription {} has unknown status '{}'",
            subscription.id,
            subscription.subscription_status
        ))
    })
}

/// Runs a locked mutation on its own task. Once a charge is issued the task
/// reaches persist-or-reconcile and releases the user lease even if the
/// caller stops waiting.
async fn run_to_completion<T, F>(user_id: Uuid, task: F) -> UseCaseResult<T>
where
    T: Send + 'static,
    F: Future<Output = UseCaseResult<T>> + Send + 'static,
{
    tokio::spawn(task).await.map_err(|err| {
        error!(%user_id, error = ?err, "subscriptions: mutation task aborted");
        SubscriptionError::Internal(anyhow!("subscription mutation task aborted: {err}"))
    })?
}

pub struct SubscriptionUseCase<S, C, L, G>
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
}

impl<S, C, L, G> Clone for SubscriptionUseCase<S, C, L, G>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    C: PaymentCardRepository + Send + Sync + 'static,
    L: LeaseRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            subscription_repo: Arc::clone(&self.subscription_repo),
            card_repo: Arc::clone(&self.card_repo),
            lease_repo: Arc::clone(&self.lease_repo),
            payment_gateway: Arc::clone(&self.payment_gateway),
            state_writer: self.state_writer.clone(),
            pricing: self.pricing.clone(),
        }
    }
}

impl<S, C, L, G> SubscriptionUseCase<S, C, L, G>
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
    ) -> Self {
        let state_writer = SubscriptionStateWriter::new(Arc::clone(&subscription_repo));
        Self {
            subscription_repo,
            card_repo,
            lease_repo,
            payment_gateway,
            state_writer,
            pricing,
        }
    }

    pub async fn get_subscription(&self, user_id: Uuid) -> UseCaseResult<SubscriptionDetailsDto> {
        let subscription = self
            .subscription_repo
            .find_by_user_id(user_id)
            .await?
            .ok_or(SubscriptionError::NotFound("subscription"))?;
        let card = self.card_repo.find_by_user_id(user_id).await?;

        Ok(SubscriptionDetailsDto::new(Some(subscription), card))
    }

    pub async fn save_card_and_subscribe(
        &self,
        user_id: Uuid,
        model: SaveCardAndSubscribeModel,
    ) -> UseCaseResult<SubscriptionDetailsDto> {
        let target = plan_type_to_status(model.plan_type).ok_or_else(|| {
            SubscriptionError::Validation(format!("unknown plan type {}", model.plan_type))
        })?;
        let price = self.price_for(target)?;
        if let Some(amount) = model.amount {
            if amount != price {
                return Err(SubscriptionError::Validation(format!(
                    "amount {amount} does not match the {target} plan price {price}"
                )));
            }
        }
        let card_ref = resolve_card_ref(
            Some(model.stripe_customer_id),
            Some(model.stripe_payment_method_id),
            None,
        )?
        .ok_or_else(|| SubscriptionError::Validation("card details are required".to_string()))?;

        let usecase = self.clone();
        run_to_completion(user_id, async move {
            let holder = usecase.acquire_user_lease(user_id).await?;
            let result = usecase
                .subscribe_locked(user_id, target, price, card_ref)
                .await;
            usecase.release_user_lease(user_id, &holder).await;
            result
        })
        .await
    }

    pub async fn change_plan(
        &self,
        user_id: Uuid,
        model: ChangePlanModel,
    ) -> UseCaseResult<SubscriptionDetailsDto> {
        let target = plan_type_to_status(model.plan_type).ok_or_else(|| {
            SubscriptionError::Validation(format!("unknown plan type {}", model.plan_type))
        })?;

        let usecase = self.clone();
        run_to_completion(user_id, async move {
            let holder = usecase.acquire_user_lease(user_id).await?;
            let result = usecase.change_plan_locked(user_id, target, model).await;
            usecase.release_user_lease(user_id, &holder).await;
            result
        })
        .await
    }

    pub async fn update_card(
        &self,
        user_id: Uuid,
        model: UpdateCardModel,
    ) -> UseCaseResult<SubscriptionDetailsDto> {
        let usecase = self.clone();
        run_to_completion(user_id, async move {
            let holder = usecase.acquire_user_lease(user_id).await?;
            let result = usecase.update_card_locked(user_id, model).await;
            usecase.release_user_lease(user_id, &holder).await;
            result
        })
        .await
    }

    pub async fn remove_card(&self, user_id: Uuid) -> UseCaseResult<SubscriptionDetailsDto> {
        let usecase = self.clone();
        run_to_completion(user_id, async move {
            let holder = usecase.acquire_user_lease(user_id).await?;
            let result = usecase.remove_card_locked(user_id).await;
            usecase.release_user_lease(user_id, &holder).await;
            result
        })
        .await
    }

    async fn subscribe_locked(
        &self,
        user_id: Uuid,
        target: SubscriptionStatus,
        price: i64,
        card_ref: CardRef,
    ) -> UseCaseResult<SubscriptionDetailsDto> {
        let existing = self.subscription_repo.find_by_user_id(user_id).await?;
        let previous_status = match existing.as_ref() {
            Some(subscription) => {
                let status = parse_status(subscription)?;
                if status.is_paid_tier() {
                    info!(%user_id, current = %status, "subscriptions: already subscribed");
                    return Err(SubscriptionError::AlreadySubscribed);
                }
                Some(status)
            }
            None => None,
        };

        let card = self.register_card(user_id, &card_ref).await?;
        let charge = self.charge(user_id, target, price, &card_ref).await?;

        let card = self
            .card_repo
            .upsert_for_user(card)
            .await
            .map_err(|err| self.reconciliation_failure(user_id, &charge.id, err))?;

        let (start, expiry) = self.pricing.period_from(Utc::now());
        let subscription = self
            .state_writer
            .persist(UpsertSubscriptionEntity {
                user_id,
                subscription_status: target.as_str().to_string(),
                subscription_start_date: Some(start),
                subscription_expiry_date: Some(expiry),
                previous_subscription_status: previous_status.map(|s| s.as_str().to_string()),
                expiry_reason: None,
                payment_card_id: Some(card.id),
                subscription_method: SUBSCRIPTION_METHOD_STRIPE.to_string(),
                subscription_method_id: Some(charge.id.clone()),
            })
            .await
            .map_err(|err| self.reconciliation_failure(user_id, &charge.id, err))?;

        info!(%user_id, plan = %target, charge_id = %charge.id, "subscriptions: subscribed");
        Ok(SubscriptionDetailsDto::new(Some(subscription), Some(card)))
    }

    async fn change_plan_locked(
        &self,
        user_id: Uuid,
        target: SubscriptionStatus,
        model: ChangePlanModel,
    ) -> UseCaseResult<SubscriptionDetailsDto> {
        let existing = self
            .subscription_repo
            .find_by_user_id(user_id)
            .await?
            .ok_or(SubscriptionError::NotFound("subscription"))?;
        let current = parse_status(&existing)?;
        let stored_card = self.card_repo.find_by_user_id(user_id).await?;

        if current == target {
            info!(%user_id, plan = %target, "subscriptions: plan unchanged");
            return Ok(SubscriptionDetailsDto::new(Some(existing), stored_card));
        }

        let card_ref = resolve_card_ref(
            model.stripe_customer_id,
            model.stripe_payment_method_id,
            stored_card.as_ref(),
        )?;
        let is_new_card = card_ref.as_ref().is_some_and(|card_ref| {
            stored_card.as_ref().map(CardRef::from).as_ref() != Some(card_ref)
        });

        let mut next = UpsertSubscriptionEntity::from(&existing);
        next.subscription_status = target.as_str().to_string();
        next.previous_subscription_status = Some(current.as_str().to_string());

        let is_downgrade = current.is_paid_tier() && target.tier_rank() < current.tier_rank();
        if is_downgrade {
            let card = match card_ref.filter(|_| is_new_card) {
                Some(card_ref) => {
                    let card = self.register_card(user_id, &card_ref).await?;
                    Some(self.card_repo.upsert_for_user(card).await?)
                }
                None => stored_card,
            };
            if let Some(card) = card.as_ref() {
                next.payment_card_id = Some(card.id);
            }

            let subscription = self.state_writer.persist(next).await?;
            info!(%user_id, from = %current, to = %target, "subscriptions: downgraded without charge");
            return Ok(SubscriptionDetailsDto::new(Some(subscription), card));
        }

        let card_ref = card_ref.ok_or(SubscriptionError::NoCardOnFile)?;
        let pending_card = if is_new_card {
            Some(self.register_card(user_id, &card_ref).await?)
        } else {
            None
        };

        let price = self.price_for(target)?;
        let charge = self.charge(user_id, target, price, &card_ref).await?;

        let card = match pending_card {
            Some(pending) => Some(
                self.card_repo
                    .upsert_for_user(pending)
                    .await
                    .map_err(|err| self.reconciliation_failure(user_id, &charge.id, err))?,
            ),
            None => stored_card,
        };

        let (start, expiry) = self.pricing.period_from(Utc::now());
        next.subscription_start_date = Some(start);
        next.subscription_expiry_date = Some(expiry);
        next.expiry_reason = None;
        next.payment_card_id = card.as_ref().map(|card| card.id).or(next.payment_card_id);
        next.subscription_method = SUBSCRIPTION_METHOD_STRIPE.to_string();
        next.subscription_method_id = Some(charge.id.clone());

        let subscription = self
            .state_writer
            .persist(next)
            .await
            .map_err(|err| self.reconciliation_failure(user_id, &charge.id, err))?;

        info!(
            %user_id,
            from = %current,
            to = %target,
            charge_id = %charge.id,
            "subscriptions: plan changed"
        );
        Ok(SubscriptionDetailsDto::new(Some(subscription), card))
    }

    async fn update_card_locked(
        &self,
        user_id: Uuid,
        model: UpdateCardModel,
    ) -> UseCaseResult<SubscriptionDetailsDto> {
        let stored_card = self.card_repo.find_by_user_id(user_id).await?;
        let card_ref = resolve_card_ref(
            model.stripe_customer_id,
            Some(model.stripe_payment_method_id),
            stored_card.as_ref(),
        )?
        .ok_or_else(|| {
            SubscriptionError::Validation("stripePaymentMethodId is required".to_string())
        })?;

        let pending = self.register_card(user_id, &card_ref).await?;
        let card = self.card_repo.upsert_for_user(pending).await?;

        if let Some(old) = stored_card.filter(|old| {
            old.stripe_payment_method_id != card.stripe_payment_method_id
        }) {
            if let Err(err) = self
                .payment_gateway
                .detach_payment_method(&old.stripe_payment_method_id)
                .await
            {
                warn!(
                    %user_id,
                    payment_method_id = %old.stripe_payment_method_id,
                    error = ?err,
                    "subscriptions: failed to detach replaced payment method"
                );
            }
        }

        let subscription = self.subscription_repo.find_by_user_id(user_id).await?;
        info!(%user_id, card_id = %card.id, "subscriptions: card updated");
        Ok(SubscriptionDetailsDto::new(subscription, Some(card)))
    }

    async fn remove_card_locked(&self, user_id: Uuid) -> UseCaseResult<SubscriptionDetailsDto> {
        let card = self
            .card_repo
            .find_by_user_id(user_id)
            .await?
            .ok_or(SubscriptionError::NotFound("payment card"))?;

        self.payment_gateway
            .detach_payment_method(&card.stripe_payment_method_id)
            .await
            .map_err(|err| {
                error!(%user_id, error = ?err, "subscriptions: failed to detach payment method");
                SubscriptionError::ExternalService(err)
            })?;

        if !self.card_repo.delete_for_user(user_id).await? {
            warn!(%user_id, "subscriptions: card vanished before delete");
        }

        let subscription = self.subscription_repo.find_by_user_id(user_id).await?;
        info!(%user_id, card_id = %card.id, "subscriptions: card removed");
        Ok(SubscriptionDetailsDto::new(subscription, None))
    }

    fn price_for(&self, status: SubscriptionStatus) -> UseCaseResult<i64> {
        self.pricing.price_for(status).ok_or_else(|| {
            SubscriptionError::Validation(format!("{status} is not a purchasable plan"))
        })
    }

    /// Attach, make default, then read back the card brand and last digits.
    async fn register_card(
        &self,
        user_id: Uuid,
        card_ref: &CardRef,
    ) -> UseCaseResult<UpsertPaymentCardEntity> {
        let gateway = &self.payment_gateway;
        let details = async {
            gateway
                .attach_payment_method(&card_ref.payment_method_id, &card_ref.customer_id)
                .await?;
            gateway
                .set_default_payment_method(&card_ref.customer_id, &card_ref.payment_method_id)
                .await?;
            gateway
                .retrieve_payment_method(&card_ref.payment_method_id)
                .await
        }
        .await
        .map_err(|err| {
            error!(
                %user_id,
                customer_id = %card_ref.customer_id,
                error = ?err,
                "subscriptions: card registration failed"
            );
            SubscriptionError::ExternalService(err)
        })?;

        Ok(UpsertPaymentCardEntity {
            user_id,
            stripe_customer_id: card_ref.customer_id.clone(),
            stripe_payment_method_id: card_ref.payment_method_id.clone(),
            card_last4_number: details.last4,
            card_brand: details.brand,
        })
    }

    async fn charge(
        &self,
        user_id: Uuid,
        plan: SubscriptionStatus,
        amount_minor: i64,
        card_ref: &CardRef,
    ) -> UseCaseResult<ChargeOutcome> {
        let outcome = self
            .payment_gateway
            .create_charge(ChargeRequest {
                amount_minor,
                currency: self.pricing.currency.clone(),
                customer_id: card_ref.customer_id.clone(),
                payment_method_id: card_ref.payment_method_id.clone(),
                description: Some(format!("{plan} plan subscription")),
            })
            .await
            .map_err(|err| {
                error!(%user_id, %plan, error = ?err, "subscriptions: charge request failed");
                SubscriptionError::ExternalService(err)
            })?;

        if !outcome.is_succeeded() {
            warn!(
                %user_id,
                %plan,
                charge_id = %outcome.id,
                status = %outcome.status,
                "subscriptions: charge declined"
            );
            return Err(SubscriptionError::PaymentDeclined);
        }
        Ok(outcome)
    }

    fn reconciliation_failure(
        &self,
        user_id: Uuid,
        charge_id: &str,
        err: anyhow::Error,
    ) -> SubscriptionError {
        error!(
            %user_id,
            charge_id,
            reconciliation_required = true,
            db_error = ?err,
            "subscriptions: local write failed after a successful charge"
        );
        SubscriptionError::Internal(err)
    }

    async fn acquire_user_lease(&self, user_id: Uuid) -> UseCaseResult<String> {
        let holder = Uuid::new_v4().to_string();
        let acquired = self
            .lease_repo
            .try_acquire(&user_lease_name(user_id), &holder, USER_LEASE_TTL_SECS)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "subscriptions: failed to acquire user lease");
                SubscriptionError::Internal(err)
            })?;

        if !acquired {
            info!(%user_id, "subscriptions: mutation already in progress");
            return Err(SubscriptionError::MutationInProgress);
        }
        Ok(holder)
    }

    async fn release_user_lease(&self, user_id: Uuid, holder: &str) {
        if let Err(err) = self
            .lease_repo
            .release(&user_lease_name(user_id), holder)
            .await
        {
            warn!(%user_id, db_error = ?err, "subscriptions: failed to release user lease");
        }
    }
}

pub fn user_lease_name(user_id: Uuid) -> String {
    format!("subscription:{user_id}")
}
