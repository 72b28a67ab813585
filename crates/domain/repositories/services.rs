use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::value_objects::service_listing::{ServiceCandidate, ServiceCandidateFilter};

#[automock]
#[async_trait]
pub trait ServiceRepository {
    /// Active services of approved businesses matching the filter, in no
    /// particular order.
    async fn list_active_candidates(
        &self,
        filter: ServiceCandidateFilter,
    ) -> Result<Vec<ServiceCandidate>>;
}
