use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{
    StatusCode,
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use serde::Deserialize;
use tracing::{error, warn};

use crate::domain::{
    repositories::payment_gateway::PaymentGateway,
    value_objects::payments::{CardDetails, ChargeOutcome, ChargeRequest},
};

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";
const DECLINED_STATUS: &str = "declined";

/// Minimal Stripe client built on reqwest.
pub struct StripeClient {
    http: reqwest::Client,
    secret_key: String,
}

#[derive(Debug, Deserialize)]
struct StripeErrorEnvelope {
    error: StripeErrorDetails,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
struct StripeErrorDetails {
    #[serde(rename = "type")]
    type_: Option<String>,
    code: Option<String>,
    message: Option<String>,
    param: Option<String>,
    decline_code: Option<String>,
    payment_intent: Option<StripeErrorPaymentIntent>,
}

#[derive(Debug, Deserialize, PartialEq)]
struct StripeErrorPaymentIntent {
    id: String,
}

#[derive(Debug)]
struct StripeFailure {
    status: StatusCode,
    request_id: Option<String>,
    details: StripeErrorDetails,
    body: String,
}

#[derive(Debug, Deserialize)]
struct PaymentIntentResp {
    id: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct PaymentMethodResp {
    card: Option<PaymentMethodCard>,
}

#[derive(Debug, Deserialize)]
struct PaymentMethodCard {
    brand: Option<String>,
    last4: Option<String>,
}

fn parse_error_details(body: &str) -> StripeErrorDetails {
    serde_json::from_str::<StripeErrorEnvelope>(body)
        .map(|envelope| envelope.error)
        .unwrap_or_default()
}

/// Stripe reports a declined card as a 402 `card_error`; everything else is an API failure.
fn is_card_decline(status: StatusCode, details: &StripeErrorDetails) -> bool {
    status == StatusCode::PAYMENT_REQUIRED || details.type_.as_deref() == Some("card_error")
}

impl StripeClient {
    pub fn new(secret_key: String, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, secret_key })
    }

    async fn read_failure(resp: reqwest::Response) -> StripeFailure {
        let status = resp.status();
        let request_id = resp
            .headers()
            .get("request-id")
            .or_else(|| resp.headers().get("stripe-request-id"))
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        StripeFailure {
            status,
            request_id,
            details: parse_error_details(&body),
            body,
        }
    }

    fn log_failure(failure: &StripeFailure, context: &str) {
        error!(
            status = %failure.status,
            stripe_request_id = ?failure.request_id,
            stripe_error_type = ?failure.details.type_,
            stripe_error_code = ?failure.details.code,
            stripe_error_param = ?failure.details.param,
            stripe_error_message = ?failure.details.message,
            stripe_decline_code = ?failure.details.decline_code,
            response_body = %failure.body,
            context = %context,
            "stripe api request failed"
        );
    }

    async fn ensure_success(resp: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let failure = Self::read_failure(resp).await;
        Self::log_failure(&failure, context);

        anyhow::bail!(
            "Stripe API request failed: {} (status {}, request_id={:?})",
            context,
            failure.status,
            failure.request_id
        );
    }

    async fn post_form(
        &self,
        path: &str,
        body: &[(String, String)],
    ) -> Result<reqwest::Response> {
        let resp = self
            .http
            .post(format!("{STRIPE_API_BASE}{path}"))
            .header(AUTHORIZATION, format!("Bearer {}", self.secret_key))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .form(body)
            .send()
            .await?;
        Ok(resp)
    }
}

#[async_trait]
impl PaymentGateway for StripeClient {
    /// Creates and confirms an off-session PaymentIntent.
    async fn create_charge(&self, request: ChargeRequest) -> Result<ChargeOutcome> {
        // https://stripe.com/docs/api/payment_intents/create
        let mut body: Vec<(String, String)> = vec![
            ("amount".to_string(), request.amount_minor.to_string()),
            ("currency".to_string(), request.currency.clone()),
            ("customer".to_string(), request.customer_id.clone()),
            ("payment_method".to_string(), request.payment_method_id.clone()),
            ("payment_method_types[0]".to_string(), "card".to_string()),
            ("confirm".to_string(), "true".to_string()),
            ("off_session".to_string(), "true".to_string()),
        ];
        if let Some(description) = request.description {
            body.push(("description".to_string(), description));
        }

        let resp = self.post_form("/payment_intents", &body).await?;

        if !resp.status().is_success() {
            let failure = Self::read_failure(resp).await;
            if is_card_decline(failure.status, &failure.details) {
                warn!(
                    customer_id = %request.customer_id,
                    stripe_request_id = ?failure.request_id,
                    stripe_decline_code = ?failure.details.decline_code,
                    stripe_error_code = ?failure.details.code,
                    "stripe: charge declined"
                );
                let id = failure
                    .details
                    .payment_intent
                    .map(|intent| intent.id)
                    .unwrap_or_default();
                return Ok(ChargeOutcome {
                    id,
                    status: DECLINED_STATUS.to_string(),
                });
            }

            Self::log_failure(&failure, "create payment intent");
            anyhow::bail!(
                "Stripe API request failed: create payment intent (status {}, request_id={:?})",
                failure.status,
                failure.request_id
            );
        }

        let intent: PaymentIntentResp = resp.json().await?;
        Ok(ChargeOutcome {
            id: intent.id,
            status: intent.status,
        })
    }

    async fn attach_payment_method(&self, payment_method_id: &str, customer_id: &str) -> Result<()> {
        // https://stripe.com/docs/api/payment_methods/attach
        let body = vec![("customer".to_string(), customer_id.to_string())];
        let resp = self
            .post_form(&format!("/payment_methods/{payment_method_id}/attach"), &body)
            .await?;
        Self::ensure_success(resp, "attach payment method").await?;

        Ok(())
    }

    async fn detach_payment_method(&self, payment_method_id: &str) -> Result<()> {
        // https://stripe.com/docs/api/payment_methods/detach
        let resp = self
            .post_form(&format!("/payment_methods/{payment_method_id}/detach"), &[])
            .await?;
        Self::ensure_success(resp, "detach payment method").await?;

        Ok(())
    }

    async fn set_default_payment_method(
        &self,
        customer_id: &str,
        payment_method_id: &str,
    ) -> Result<()> {
        // https://stripe.com/docs/api/customers/update
        let body = vec![(
            "invoice_settings[default_payment_method]".to_string(),
            payment_method_id.to_string(),
        )];
        let resp = self
            .post_form(&format!("/customers/{customer_id}"), &body)
            .await?;
        Self::ensure_success(resp, "set default payment method").await?;

        Ok(())
    }

    async fn retrieve_payment_method(&self, payment_method_id: &str) -> Result<CardDetails> {
        // https://stripe.com/docs/api/payment_methods/retrieve
        let resp = self
            .http
            .get(format!("{STRIPE_API_BASE}/payment_methods/{payment_method_id}"))
            .header(AUTHORIZATION, format!("Bearer {}", self.secret_key))
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "retrieve payment method").await?;

        let parsed: PaymentMethodResp = resp.json().await?;
        let card = parsed.card.map_or_else(CardDetails::default, |card| CardDetails {
            brand: card.brand,
            last4: card.last4,
        });
        Ok(card)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_card_error_envelope() {
        let body = r#"{"error":{"type":"card_error","code":"card_declined","decline_code":"insufficient_funds","payment_intent":{"id":"pi_123","status":"requires_payment_method"}}}"#;
        let details = parse_error_details(body);

        assert_eq!(details.type_.as_deref(), Some("card_error"));
        assert_eq!(details.decline_code.as_deref(), Some("insufficient_funds"));
        assert_eq!(details.payment_intent.map(|pi| pi.id).as_deref(), Some("pi_123"));
    }

    #[test]
    fn unparseable_body_has_no_details() {
        assert_eq!(parse_error_details("<html>"), StripeErrorDetails::default());
    }

    #[test]
    fn only_card_errors_count_as_declines() {
        let card_error = StripeErrorDetails {
            type_: Some("card_error".to_string()),
            ..Default::default()
        };
        let api_error = StripeErrorDetails {
            type_: Some("api_error".to_string()),
            ..Default::default()
        };

        assert!(is_card_decline(StatusCode::PAYMENT_REQUIRED, &StripeErrorDetails::default()));
        assert!(is_card_decline(StatusCode::BAD_REQUEST, &card_error));
        assert!(!is_card_decline(StatusCode::INTERNAL_SERVER_ERROR, &api_error));
        assert!(!is_card_decline(StatusCode::UNAUTHORIZED, &StripeErrorDetails::default()));
    }
}
