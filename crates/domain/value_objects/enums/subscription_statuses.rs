use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Trial,
    Standard,
    Sponsored,
    Expired,
}

impl SubscriptionStatus {
    /// Statuses the billing sweep renews or expires once their expiry date passes.
    pub const BILLABLE: [SubscriptionStatus; 3] = [
        SubscriptionStatus::Trial,
        SubscriptionStatus::Standard,
        SubscriptionStatus::Sponsored,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Trial => "trial",
            SubscriptionStatus::Standard => "standard",
            SubscriptionStatus::Sponsored => "sponsored",
            SubscriptionStatus::Expired => "expired",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "trial" => Some(SubscriptionStatus::Trial),
            "standard" => Some(SubscriptionStatus::Standard),
            "sponsored" => Some(SubscriptionStatus::Sponsored),
            "expired" => Some(SubscriptionStatus::Expired),
            _ => None,
        }
    }

    pub fn is_paid_tier(&self) -> bool {
        matches!(
            self,
            SubscriptionStatus::Standard | SubscriptionStatus::Sponsored
        )
    }

    /// Ordering used to tell upgrades from downgrades. Only paid tiers rank above zero.
    pub fn tier_rank(&self) -> u8 {
        match self {
            SubscriptionStatus::Standard => 1,
            SubscriptionStatus::Sponsored => 2,
            SubscriptionStatus::Trial | SubscriptionStatus::Expired => 0,
        }
    }
}

impl Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_status_it_prints() {
        for status in [
            SubscriptionStatus::Trial,
            SubscriptionStatus::Standard,
            SubscriptionStatus::Sponsored,
            SubscriptionStatus::Expired,
        ] {
            assert_eq!(SubscriptionStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(SubscriptionStatus::from_str("active"), None);
    }

    #[test]
    fn sponsored_outranks_standard() {
        assert!(SubscriptionStatus::Sponsored.tier_rank() > SubscriptionStatus::Standard.tier_rank());
        assert_eq!(SubscriptionStatus::Expired.tier_rank(), 0);
    }
}
