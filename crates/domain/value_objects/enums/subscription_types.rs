use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Tier stored on a business profile. Read by ranking as the first sort key.
#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionType {
    #[default]
    Free,
    Standard,
    Sponsored,
}

impl SubscriptionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionType::Free => "free",
            SubscriptionType::Standard => "standard",
            SubscriptionType::Sponsored => "sponsored",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "free" => Some(SubscriptionType::Free),
            "standard" => Some(SubscriptionType::Standard),
            "sponsored" => Some(SubscriptionType::Sponsored),
            _ => None,
        }
    }

    pub fn is_sponsored(&self) -> bool {
        matches!(self, SubscriptionType::Sponsored)
    }
}

impl Display for SubscriptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
