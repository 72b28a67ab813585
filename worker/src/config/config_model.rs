use std::time::Duration;

use backend::config::config_model::{Database, Stripe};
use marketplace::domain::value_objects::plans::PlanPricing;

#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub database: Database,
    pub stripe: Stripe,
    pub pricing: PlanPricing,
    pub billing_sweep: BillingSweep,
}

#[derive(Debug, Clone)]
pub struct BillingSweep {
    pub interval_secs: u64,
    /// Longer than one tick so a slow sweep keeps its lease.
    pub lease_ttl_secs: i64,
}

impl BillingSweep {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}
