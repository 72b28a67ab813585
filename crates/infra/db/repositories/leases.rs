use anyhow::Result;
use async_trait::async_trait;
use diesel::{prelude::*, sql_query, sql_types};
use std::sync::Arc;

use crate::{
    domain::repositories::leases::LeaseRepository,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::leases},
};

pub struct LeasePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl LeasePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl LeaseRepository for LeasePostgres {
    async fn try_acquire(&self, name: &str, holder: &str, ttl_secs: i64) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // The conditional upsert touches zero rows while someone else holds a live lease.
        let affected = sql_query(
            "INSERT INTO leases (name, holder, expires_at) \
             VALUES ($1, $2, now() + make_interval(secs => $3)) \
             ON CONFLICT (name) DO UPDATE \
             SET holder = EXCLUDED.holder, expires_at = EXCLUDED.expires_at \
             WHERE leases.expires_at < now() OR leases.holder = EXCLUDED.holder",
        )
        .bind::<sql_types::Text, _>(name)
        .bind::<sql_types::Text, _>(holder)
        .bind::<sql_types::Double, _>(ttl_secs as f64)
        .execute(&mut conn)?;

        Ok(affected == 1)
    }

    async fn release(&self, name: &str, holder: &str) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        diesel::delete(
            leases::table
                .filter(leases::name.eq(name))
                .filter(leases::holder.eq(holder)),
        )
        .execute(&mut conn)?;

        Ok(())
    }
}
