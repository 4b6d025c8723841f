use axum::extract::{Extension, Path, State};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::coupons::available_coupon;
use super::validation::FieldErrors;
use crate::database::models::Payment;
use crate::database::PaymentRepository;
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, Authorized};
use crate::services::payments::charge_in_minor_units;
use crate::state::AppState;

const CURRENCY: &str = "usd";

#[derive(Debug, Deserialize)]
pub struct IntentRequest {
    pub amount: Option<Decimal>,
    pub coupon_code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct IntentCreated {
    pub client_secret: String,
    /// Amount actually charged, after discount.
    pub amount: Decimal,
    pub discount: i32,
}

#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    pub name: Option<String>,
    pub month: Option<String>,
    pub amount: Option<Decimal>,
    pub discount: Option<i32>,
    pub transaction_id: Option<String>,
    pub floor: Option<i32>,
    pub block: Option<String>,
    pub apartment_no: Option<String>,
    pub coupon_code: Option<String>,
}

/// POST /create-payment-intent - Start a card payment with the processor
///
/// An available coupon's percent discount is applied before conversion to
/// minor units.
pub async fn create_intent(
    State(state): State<AppState>,
    Extension(caller): Extension<Authorized>,
    ApiJson(body): ApiJson<IntentRequest>,
) -> ApiResult<IntentCreated> {
    let mut fields = FieldErrors::new();
    let Some(amount) = fields.require("amount", body.amount) else {
        return Err(fields.into_error());
    };

    let gateway = state
        .payments
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Payment processor is not configured"))?;

    let discount = match body.coupon_code.filter(|c| !c.trim().is_empty()) {
        Some(code) => available_coupon(&state, code.trim()).await?.discount,
        None => 0,
    };

    let (payable, minor) = charge_in_minor_units(amount, discount)?;
    let intent = gateway.create_intent(minor, CURRENCY).await?;

    tracing::info!(
        email = %caller.user.email,
        intent = %intent.id,
        amount_minor = minor,
        discount,
        "Payment intent created"
    );
    Ok(ApiResponse::success(IntentCreated {
        client_secret: intent.client_secret,
        amount: payable,
        discount,
    }))
}

/// POST /payments - Record a payment the processor already confirmed
pub async fn record(
    State(state): State<AppState>,
    Extension(caller): Extension<Authorized>,
    ApiJson(body): ApiJson<PaymentRequest>,
) -> ApiResult<Payment> {
    let mut fields = FieldErrors::new();
    let month = fields.require_text("month", body.month);
    let amount = fields.require("amount", body.amount);
    let transaction_id = fields.require_text("transaction_id", body.transaction_id);
    let floor = fields.require("floor", body.floor);
    let block = fields.require_text("block", body.block);
    let apartment_no = fields.require_text("apartment_no", body.apartment_no);
    if amount.is_some_and(|amount| amount <= Decimal::ZERO) {
        fields.reject("amount", "Amount must be positive");
    }
    let discount = body.discount.unwrap_or(0);
    if !(0..=100).contains(&discount) {
        fields.reject("discount", "Discount must be between 0 and 100");
    }
    let (Some(month), Some(amount), Some(transaction_id), Some(floor), Some(block), Some(apartment_no)) =
        (month, amount, transaction_id, floor, block, apartment_no)
    else {
        return Err(fields.into_error());
    };
    fields.finish()?;

    let name = body
        .name
        .filter(|n| !n.trim().is_empty())
        .or_else(|| caller.user.name.clone())
        .unwrap_or_default();
    let payment = Payment {
        id: Uuid::new_v4(),
        email: caller.user.email.clone(),
        name,
        month,
        amount,
        discount,
        transaction_id,
        floor,
        block,
        apartment_no,
        coupon_code: body.coupon_code.filter(|c| !c.trim().is_empty()),
        paid_at: Utc::now(),
    };
    state.store.insert_payment(&payment).await?;

    tracing::info!(email = %payment.email, month = %payment.month, "Payment recorded");
    Ok(ApiResponse::created(payment))
}

/// GET /payments - All payments (admin)
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Payment>> {
    Ok(ApiResponse::success(state.store.list_payments().await?))
}

/// GET /payments/user/:email - A member's payment history (self or admin)
pub async fn for_user(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Extension(caller): Extension<Authorized>,
) -> ApiResult<Vec<Payment>> {
    caller.ensure_self_or_admin(&email)?;
    Ok(ApiResponse::success(state.store.list_payments_for(&email).await?))
}
