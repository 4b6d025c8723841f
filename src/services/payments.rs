use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("invalid payment amount: {0}")]
    InvalidAmount(String),

    #[error("payment processor error: {0}")]
    Upstream(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

/// Third-party payment processor. Only intent creation is delegated; the
/// confirmed payment is recorded locally by the client afterwards.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_intent(&self, amount_minor: i64, currency: &str) -> Result<PaymentIntent, PaymentError>;
}

/// Apply a percent discount and convert to minor units (cents).
pub fn charge_in_minor_units(amount: Decimal, discount_percent: i32) -> Result<(Decimal, i64), PaymentError> {
    if amount <= Decimal::ZERO {
        return Err(PaymentError::InvalidAmount("amount must be positive".to_string()));
    }
    if !(0..=100).contains(&discount_percent) {
        return Err(PaymentError::InvalidAmount(format!("discount {discount_percent}% out of range")));
    }

    let too_large = || PaymentError::InvalidAmount("amount too large".to_string());
    let hundred = Decimal::ONE_HUNDRED;
    let payable = amount
        .checked_mul(hundred - Decimal::from(discount_percent))
        .and_then(|scaled| scaled.checked_div(hundred))
        .ok_or_else(too_large)?;
    let minor = payable
        .checked_mul(hundred)
        .ok_or_else(too_large)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
        .to_i64()
        .ok_or_else(too_large)?;
    if minor == 0 {
        return Err(PaymentError::InvalidAmount("nothing left to charge".to_string()));
    }

    Ok((payable.round_dp(2), minor))
}

pub struct StripeGateway {
    client: reqwest::Client,
    api_base: String,
    secret_key: String,
}

#[derive(Debug, Deserialize)]
struct StripeIntent {
    id: String,
    client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    message: Option<String>,
}

impl StripeGateway {
    pub fn new(client: reqwest::Client, api_base: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            secret_key: secret_key.into(),
        }
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_intent(&self, amount_minor: i64, currency: &str) -> Result<PaymentIntent, PaymentError> {
        let amount = amount_minor.to_string();
        let response = self
            .client
            .post(format!("{}/v1/payment_intents", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(&[
                ("amount", amount.as_str()),
                ("currency", currency),
                ("payment_method_types[]", "card"),
            ])
            .send()
            .await
            .map_err(|e| PaymentError::Upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<StripeErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error.message)
                .unwrap_or_else(|| format!("processor answered {status}"));
            return Err(PaymentError::Upstream(detail));
        }

        let intent: StripeIntent = response
            .json()
            .await
            .map_err(|e| PaymentError::Upstream(e.to_string()))?;
        let client_secret = intent
            .client_secret
            .ok_or_else(|| PaymentError::Upstream("intent has no client secret".to_string()))?;

        Ok(PaymentIntent {
            id: intent.id,
            client_secret,
        })
    }
}
