use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{RunQueryDsl, delete, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{payment_cards, subscriptions},
    },
};
use domain::{
    entities::payment_cards::{PaymentCardEntity, UpsertPaymentCardEntity},
    repositories::payment_cards::PaymentCardRepository,
};

pub struct PaymentCardPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PaymentCardPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PaymentCardRepository for PaymentCardPostgres {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<PaymentCardEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = payment_cards::table
            .filter(payment_cards::user_id.eq(user_id))
            .select(PaymentCardEntity::as_select())
            .first::<PaymentCardEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_by_id(&self, card_id: Uuid) -> Result<Option<PaymentCardEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = payment_cards::table
            .find(card_id)
            .select(PaymentCardEntity::as_select())
            .first::<PaymentCardEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn upsert_for_user(&self, card: UpsertPaymentCardEntity) -> Result<PaymentCardEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let now = Utc::now();

        let saved = conn.transaction::<PaymentCardEntity, diesel::result::Error, _>(|conn| {
            let saved = insert_into(payment_cards::table)
                .values(&card)
                .on_conflict(payment_cards::user_id)
                .do_update()
                .set((&card, payment_cards::updated_at.eq(now)))
                .returning(PaymentCardEntity::as_select())
                .get_result::<PaymentCardEntity>(conn)?;

            update(subscriptions::table)
                .filter(subscriptions::user_id.eq(card.user_id))
                .set((
                    subscriptions::payment_card_id.eq(Some(saved.id)),
                    subscriptions::updated_at.eq(now),
                ))
                .execute(conn)?;

            Ok(saved)
        })?;

        Ok(saved)
    }

    async fn delete_for_user(&self, user_id: Uuid) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let deleted = conn.transaction::<usize, diesel::result::Error, _>(|conn| {
            update(subscriptions::table)
                .filter(subscriptions::user_id.eq(user_id))
                .set((
                    subscriptions::payment_card_id.eq(None::<Uuid>),
                    subscriptions::updated_at.eq(Utc::now()),
                ))
                .execute(conn)?;

            delete(payment_cards::table.filter(payment_cards::user_id.eq(user_id))).execute(conn)
        })?;

        Ok(deleted > 0)
    }
}
