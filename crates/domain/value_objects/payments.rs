use serde::{Deserialize, Serialize};

pub const CHARGE_STATUS_SUCCEEDED: &str = "succeeded";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeRequest {
    pub amount_minor: i64,
    pub currency: String,
    pub customer_id: String,
    pub payment_method_id: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChargeOutcome {
    pub id: String,
    pub status: String,
}

impl ChargeOutcome {
    /// Anything but `succeeded` is treated as a decline.
    pub fn is_succeeded(&self) -> bool {
        self.status == CHARGE_STATUS_SUCCEEDED
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardDetails {
    pub brand: Option<String>,
    pub last4: Option<String>,
}
