use std::str::FromStr;

use anyhow::{Context, Result};
use marketplace::domain::value_objects::{
    geo::{DEFAULT_DISCOVERY_RADIUS_METERS, DEFAULT_RANKING_RADIUS_METERS},
    plans::PlanPricing,
};

use super::config_model::{
    Auth, BackendServer, Database, Discovery, DotEnvyConfig, Stripe,
};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let backend_server = BackendServer {
        port: env_required_parse("SERVER_PORT_BACKEND")?,
        body_limit: env_parse_or("SERVER_BODY_LIMIT", 10)?,
        timeout: env_parse_or("SERVER_TIMEOUT", 30)?,
    };

    let discovery = Discovery {
        ranking_max_distance_meters: env_parse_or(
            "RANKING_MAX_DISTANCE_METERS",
            DEFAULT_RANKING_RADIUS_METERS,
        )?,
        default_distance_meters: env_parse_or(
            "DISCOVERY_DEFAULT_DISTANCE_METERS",
            DEFAULT_DISCOVERY_RADIUS_METERS,
        )?,
    };

    Ok(DotEnvyConfig {
        backend_server,
        database: load_database()?,
        auth: Auth {
            jwt_secret: get_auth_secret()?,
        },
        stripe: load_stripe()?,
        pricing: load_plan_pricing()?,
        discovery,
    })
}

pub fn load_database() -> Result<Database> {
    Ok(Database {
        url: env_required("DATABASE_URL")?,
        max_pool_size: env_parse_or("DATABASE_MAX_POOL_SIZE", 10)?,
        connect_timeout_secs: env_parse_or("DATABASE_CONNECT_TIMEOUT_SECS", 5)?,
    })
}

pub fn load_stripe() -> Result<Stripe> {
    Ok(Stripe {
        secret_key: env_required("STRIPE_SECRET_KEY")?,
        timeout_secs: env_parse_or("STRIPE_TIMEOUT_SECS", 15)?,
    })
}

pub fn load_plan_pricing() -> Result<PlanPricing> {
    let defaults = PlanPricing::default();

    Ok(PlanPricing {
        currency: std::env::var("PLAN_CURRENCY")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(defaults.currency),
        standard_price_minor: env_parse_or(
            "PLAN_STANDARD_PRICE_MINOR",
            defaults.standard_price_minor,
        )?,
        sponsored_price_minor: env_parse_or(
            "PLAN_SPONSORED_PRICE_MINOR",
            defaults.sponsored_price_minor,
        )?,
        renewal_price_minor: env_parse_or(
            "PLAN_RENEWAL_PRICE_MINOR",
            defaults.renewal_price_minor,
        )?,
        period_days: env_parse_or("PLAN_PERIOD_DAYS", defaults.period_days)?,
    })
}

pub fn get_auth_secret() -> Result<String> {
    dotenvy::dotenv().ok();
    env_required("JWT_SECRET")
}

pub fn env_required(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("{key} is not set"))
}

fn env_required_parse<T>(key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    env_required(key)?
        .trim()
        .parse()
        .with_context(|| format!("{key} is invalid"))
}

pub fn env_parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} is invalid")),
        _ => Ok(default),
    }
}
