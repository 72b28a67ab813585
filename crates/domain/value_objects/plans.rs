use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::enums::{
    subscription_statuses::SubscriptionStatus, subscription_types::SubscriptionType,
};

pub const STANDARD_PLAN_TYPE: i32 = 1;
pub const SPONSORED_PLAN_TYPE: i32 = 2;
pub const UNKNOWN_PLAN_TYPE: i32 = 0;

/// Maps the numeric plan identifier clients send to the subscription status it buys.
pub fn plan_type_to_status(plan_type: i32) -> Option<SubscriptionStatus> {
    match plan_type {
        STANDARD_PLAN_TYPE => Some(SubscriptionStatus::Standard),
        SPONSORED_PLAN_TYPE => Some(SubscriptionStatus::Sponsored),
        _ => None,
    }
}

pub fn status_to_plan_type(status: SubscriptionStatus) -> i32 {
    match status {
        SubscriptionStatus::Standard => STANDARD_PLAN_TYPE,
        SubscriptionStatus::Sponsored => SPONSORED_PLAN_TYPE,
        SubscriptionStatus::Trial | SubscriptionStatus::Expired => UNKNOWN_PLAN_TYPE,
    }
}

/// Business tier that must accompany a subscription status.
///
/// `None` means the business keeps whatever tier it already has (trial).
pub fn business_tier_for_status(status: SubscriptionStatus) -> Option<SubscriptionType> {
    match status {
        SubscriptionStatus::Standard => Some(SubscriptionType::Standard),
        SubscriptionStatus::Sponsored => Some(SubscriptionType::Sponsored),
        SubscriptionStatus::Expired => Some(SubscriptionType::Free),
        SubscriptionStatus::Trial => None,
    }
}

/// Prices are configuration, never derived from processor state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanPricing {
    pub currency: String,
    pub standard_price_minor: i64,
    pub sponsored_price_minor: i64,
    pub renewal_price_minor: i64,
    pub period_days: i64,
}

impl Default for PlanPricing {
    fn default() -> Self {
        Self {
            currency: "usd".to_string(),
            standard_price_minor: 2000,
            sponsored_price_minor: 10000,
            renewal_price_minor: 2000,
            period_days: 30,
        }
    }
}

impl PlanPricing {
    pub fn price_for(&self, status: SubscriptionStatus) -> Option<i64> {
        match status {
            SubscriptionStatus::Standard => Some(self.standard_price_minor),
            SubscriptionStatus::Sponsored => Some(self.sponsored_price_minor),
            SubscriptionStatus::Trial | SubscriptionStatus::Expired => None,
        }
    }

    pub fn period(&self) -> Duration {
        Duration::days(self.period_days)
    }

    /// Start and expiry of a billing period beginning at `now`.
    pub fn period_from(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        (now, now + self.period())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_types_round_trip_for_paid_plans() {
        for plan_type in [STANDARD_PLAN_TYPE, SPONSORED_PLAN_TYPE] {
            let status = plan_type_to_status(plan_type).expect("paid plan");
            assert_eq!(status_to_plan_type(status), plan_type);
        }
    }

    #[test]
    fn unknown_plan_types_map_to_nothing() {
        assert_eq!(plan_type_to_status(0), None);
        assert_eq!(plan_type_to_status(3), None);
        assert_eq!(plan_type_to_status(-1), None);
        assert_eq!(status_to_plan_type(SubscriptionStatus::Trial), UNKNOWN_PLAN_TYPE);
        assert_eq!(status_to_plan_type(SubscriptionStatus::Expired), UNKNOWN_PLAN_TYPE);
    }

    #[test]
    fn business_tier_follows_fixed_mapping() {
        assert_eq!(
            business_tier_for_status(SubscriptionStatus::Standard),
            Some(SubscriptionType::Standard)
        );
        assert_eq!(
            business_tier_for_status(SubscriptionStatus::Sponsored),
            Some(SubscriptionType::Sponsored)
        );
        assert_eq!(
            business_tier_for_status(SubscriptionStatus::Expired),
            Some(SubscriptionType::Free)
        );
        assert_eq!(business_tier_for_status(SubscriptionStatus::Trial), None);
    }

    #[test]
    fn default_pricing() {
        let pricing = PlanPricing::default();
        assert_eq!(pricing.price_for(SubscriptionStatus::Standard), Some(2000));
        assert_eq!(pricing.price_for(SubscriptionStatus::Sponsored), Some(10000));
        assert_eq!(pricing.price_for(SubscriptionStatus::Expired), None);
        assert_eq!(pricing.period(), Duration::days(30));
    }
}
