use std::time::Duration;

use marketplace::{
    domain::value_objects::plans::PlanPricing,
    infra::db::postgres::postgres_connection::PoolSettings,
};

#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub backend_server: BackendServer,
    pub database: Database,
    pub auth: Auth,
    pub stripe: Stripe,
    pub pricing: PlanPricing,
    pub discovery: Discovery,
}

#[derive(Debug, Clone)]
pub struct BackendServer {
    pub port: u16,
    /// MiB
    pub body_limit: u64,
    /// Seconds
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
    pub max_pool_size: u32,
    pub connect_timeout_secs: u64,
}

impl Database {
    pub fn pool_settings(&self) -> PoolSettings {
        PoolSettings {
            max_size: self.max_pool_size,
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Auth {
    pub jwt_secret: String,
}

#[derive(Debug, Clone)]
pub struct Stripe {
    pub secret_key: String,
    pub timeout_secs: u64,
}

impl Stripe {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone)]
pub struct Discovery {
    pub ranking_max_distance_meters: f64,
    pub default_distance_meters: f64,
}
