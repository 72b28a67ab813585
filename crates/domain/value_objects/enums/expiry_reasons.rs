use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Why the billing sweep expired a subscription. Persisted as the codes `"0"` and `"1"`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExpiryReason {
    NoCard,
    ChargeFailed,
}

impl ExpiryReason {
    pub fn code(&self) -> &'static str {
        match self {
            ExpiryReason::NoCard => "0",
            ExpiryReason::ChargeFailed => "1",
        }
    }

    pub fn from_code(value: &str) -> Option<Self> {
        match value {
            "0" => Some(ExpiryReason::NoCard),
            "1" => Some(ExpiryReason::ChargeFailed),
            _ => None,
        }
    }
}

impl Display for ExpiryReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
