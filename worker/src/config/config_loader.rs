use anyhow::{Result, bail};
use backend::config::config_loader::{
    env_parse_or, load_database, load_plan_pricing, load_stripe,
};

use super::config_model::{BillingSweep, DotEnvyConfig};

pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;
pub const DEFAULT_SWEEP_LEASE_TTL_SECS: i64 = 900;

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    Ok(DotEnvyConfig {
        database: load_database()?,
        stripe: load_stripe()?,
        pricing: load_plan_pricing()?,
        billing_sweep: load_billing_sweep()?,
    })
}

pub fn load_billing_sweep() -> Result<BillingSweep> {
    let billing_sweep = BillingSweep {
        interval_secs: env_parse_or("BILLING_SWEEP_INTERVAL_SECS", DEFAULT_SWEEP_INTERVAL_SECS)?,
        lease_ttl_secs: env_parse_or(
            "BILLING_SWEEP_LEASE_TTL_SECS",
            DEFAULT_SWEEP_LEASE_TTL_SECS,
        )?,
    };
    validate_billing_sweep(&billing_sweep)?;
    Ok(billing_sweep)
}

fn validate_billing_sweep(billing_sweep: &BillingSweep) -> Result<()> {
    if billing_sweep.interval_secs == 0 {
        bail!("BILLING_SWEEP_INTERVAL_SECS must be positive");
    }
    if billing_sweep.lease_ttl_secs <= 0 {
        bail!("BILLING_SWEEP_LEASE_TTL_SECS must be positive");
    }
    if billing_sweep.lease_ttl_secs.unsigned_abs() <= billing_sweep.interval_secs {
        bail!(
            "BILLING_SWEEP_LEASE_TTL_SECS ({}) must be longer than BILLING_SWEEP_INTERVAL_SECS ({})",
            billing_sweep.lease_ttl_secs,
            billing_sweep.interval_secs
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_values_and_a_lease_shorter_than_the_interval() {
        assert!(
            validate_billing_sweep(&BillingSweep {
                interval_secs: 0,
                lease_ttl_secs: 900,
            })
            .is_err()
        );
        assert!(
            validate_billing_sweep(&BillingSweep {
                interval_secs: 300,
                lease_ttl_secs: 0,
            })
            .is_err()
        );
        assert!(
            validate_billing_sweep(&BillingSweep {
                interval_secs: 300,
                lease_ttl_secs: 300,
            })
            .is_err()
        );
        assert!(
            validate_billing_sweep(&BillingSweep {
                interval_secs: 600,
                lease_ttl_secs: 120,
            })
            .is_err()
        );
        assert!(
            validate_billing_sweep(&BillingSweep {
                interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
                lease_ttl_secs: DEFAULT_SWEEP_LEASE_TTL_SECS,
            })
            .is_ok()
        );
    }
}
