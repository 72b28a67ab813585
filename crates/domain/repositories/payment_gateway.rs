use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::value_objects::payments::{CardDetails, ChargeOutcome, ChargeRequest};

/// Payment processor operations. A declined charge is an `Ok` outcome, not an error.
#[automock]
#[async_trait]
pub trait PaymentGateway {
    async fn create_charge(&self, request: ChargeRequest) -> Result<ChargeOutcome>;

    async fn attach_payment_method(&self, payment_method_id: &str, customer_id: &str) -> Result<()>;

    async fn detach_payment_method(&self, payment_method_id: &str) -> Result<()>;

    async fn set_default_payment_method(
        &self,
        customer_id: &str,
        payment_method_id: &str,
    ) -> Result<()>;

    async fn retrieve_payment_method(&self, payment_method_id: &str) -> Result<CardDetails>;
}
