use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::payment_cards::{PaymentCardEntity, UpsertPaymentCardEntity};

#[automock]
#[async_trait]
pub trait PaymentCardRepository {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<PaymentCardEntity>>;

    async fn find_by_id(&self, card_id: Uuid) -> Result<Option<PaymentCardEntity>>;

    /// Replaces the user's card in place and points an existing subscription at it.
    async fn upsert_for_user(&self, card: UpsertPaymentCardEntity) -> Result<PaymentCardEntity>;

    /// Deletes the user's card and clears the subscription's reference. `false` if none existed.
    async fn delete_for_user(&self, user_id: Uuid) -> Result<bool>;
}
