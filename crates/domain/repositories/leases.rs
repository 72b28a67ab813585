use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

/// Named, expiring locks shared by every process that talks to the database.
#[automock]
#[async_trait]
pub trait LeaseRepository {
    /// Takes the lease if it is free, expired, or already held by `holder`.
    async fn try_acquire(&self, name: &str, holder: &str, ttl_secs: i64) -> Result<bool>;

    async fn release(&self, name: &str, holder: &str) -> Result<()>;
}
