use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::validation::{parse_id, FieldErrors};
use crate::database::models::{Coupon, CouponPatch};
use crate::database::CouponRepository;
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CouponRequest {
    pub code: Option<String>,
    pub discount: Option<i32>,
    pub description: Option<String>,
    pub available: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CouponValidity {
    pub valid: bool,
    pub code: String,
    pub discount: i32,
}

fn check_discount(fields: &mut FieldErrors, discount: Option<i32>) {
    if let Some(discount) = discount {
        if !(1..=100).contains(&discount) {
            fields.reject("discount", "Discount must be between 1 and 100");
        }
    }
}

/// POST /coupons - Create a coupon (admin)
pub async fn create(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CouponRequest>,
) -> ApiResult<Coupon> {
    let mut fields = FieldErrors::new();
    let code = fields.require_text("code", body.code);
    let discount = fields.require("discount", body.discount);
    check_discount(&mut fields, discount);
    let (Some(code), Some(discount)) = (code, discount) else {
        return Err(fields.into_error());
    };
    fields.finish()?;

    let mut coupon = Coupon::new(code, discount, body.description.unwrap_or_default());
    if let Some(available) = body.available {
        coupon.available = available;
    }
    state.store.insert_coupon(&coupon).await?;

    Ok(ApiResponse::created(coupon))
}

/// GET /coupons
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Coupon>> {
    Ok(ApiResponse::success(state.store.list_coupons().await?))
}

/// PATCH /coupons/:id - Update discount, description or availability (admin)
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<CouponPatch>,
) -> ApiResult<Coupon> {
    let id = parse_id(&id)?;
    if patch.is_empty() {
        return Err(ApiError::validation_error("No fields to update", None));
    }
    let mut fields = FieldErrors::new();
    check_discount(&mut fields, patch.discount);
    fields.finish()?;

    let coupon = state
        .store
        .update_coupon(id, &patch)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Coupon '{id}' not found")))?;

    Ok(ApiResponse::success(coupon))
}

/// DELETE /coupons/:id (admin)
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    let id = parse_id(&id)?;
    if !state.store.delete_coupon(id).await? {
        return Err(ApiError::not_found(format!("Coupon '{id}' not found")));
    }

    Ok(ApiResponse::success(json!({ "id": id, "deleted": true })))
}

/// POST /validate-coupon - Check a code before paying
pub async fn validate(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ValidateRequest>,
) -> ApiResult<CouponValidity> {
    let mut fields = FieldErrors::new();
    let Some(code) = fields.require_text("code", body.code) else {
        return Err(fields.into_error());
    };

    let coupon = available_coupon(&state, &code).await?;
    Ok(ApiResponse::success(CouponValidity {
        valid: true,
        code: coupon.code,
        discount: coupon.discount,
    }))
}

/// The coupon for `code` if it exists and is currently offered.
pub(crate) async fn available_coupon(state: &AppState, code: &str) -> Result<Coupon, ApiError> {
    state
        .store
        .find_coupon_by_code(code)
        .await?
        .filter(|coupon| coupon.available)
        .ok_or_else(|| ApiError::not_found("Invalid or unavailable coupon"))
}
