use axum::extract::{Extension, Path, Query, State};
use rust_decimal::Decimal;
use serde::Deserialize;

use super::validation::{parse_id, FieldErrors};
use crate::database::models::{Agreement, AgreementStatus, NewAgreement, Role};
use crate::database::{AgreementRepository, UserRepository};
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, Authorized};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AgreementRequest {
    pub tenant_name: Option<String>,
    pub tenant_email: Option<String>,
    pub floor: Option<i32>,
    pub block: Option<String>,
    pub apartment_no: Option<String>,
    pub rent: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: Option<String>,
}

/// POST /agreements - Apply for an apartment
///
/// The tenant email defaults to the caller's and may not name anyone else.
/// A tenant holds at most one agreement, whatever its status.
pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<Authorized>,
    ApiJson(body): ApiJson<AgreementRequest>,
) -> ApiResult<Agreement> {
    let mut fields = FieldErrors::new();
    let tenant_name = body
        .tenant_name
        .filter(|n| !n.trim().is_empty())
        .or_else(|| caller.user.name.clone());
    let tenant_name = fields.require_text("tenant_name", tenant_name);
    let floor = fields.require("floor", body.floor);
    let block = fields.require_text("block", body.block);
    let apartment_no = fields.require_text("apartment_no", body.apartment_no);
    let rent = fields.require("rent", body.rent);
    if rent.is_some_and(|rent| rent <= Decimal::ZERO) {
        fields.reject("rent", "Rent must be positive");
    }
    let (Some(tenant_name), Some(floor), Some(block), Some(apartment_no), Some(rent)) =
        (tenant_name, floor, block, apartment_no, rent)
    else {
        return Err(fields.into_error());
    };
    fields.finish()?;

    let tenant_email = match body.tenant_email.map(|e| e.trim().to_string()) {
        Some(email) if !email.is_empty() && email != caller.user.email => {
            return Err(ApiError::forbidden("Cannot apply on behalf of another tenant"));
        }
        _ => caller.user.email.clone(),
    };

    if state.store.find_agreement_by_email(&tenant_email).await?.is_some() {
        return Err(ApiError::conflict("An agreement already exists for this tenant"));
    }

    let agreement = Agreement::from(NewAgreement {
        tenant_name,
        tenant_email,
        floor,
        block,
        apartment_no,
        rent,
    });
    state.store.insert_agreement(&agreement).await?;

    tracing::info!(tenant = %agreement.tenant_email, apartment = %agreement.apartment_no, "Agreement submitted");
    Ok(ApiResponse::created(agreement))
}

/// GET /agreements - All agreements, newest first, optionally `?status=` (admin)
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Vec<Agreement>> {
    let status = match params.status.filter(|s| !s.is_empty()) {
        Some(raw) => Some(
            raw.parse::<AgreementStatus>()
                .map_err(|e| ApiError::bad_request(e.to_string()))?,
        ),
        None => None,
    };

    Ok(ApiResponse::success(state.store.list_agreements(status).await?))
}

/// GET /agreements/member/:email - The tenant's accepted agreement
pub async fn member(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Extension(caller): Extension<Authorized>,
) -> ApiResult<Agreement> {
    caller.ensure_self_or_admin(&email)?;

    let agreement = state
        .store
        .find_agreement_by_email(&email)
        .await?
        .filter(|agreement| agreement.status == AgreementStatus::Checked)
        .ok_or_else(|| ApiError::not_found("No accepted agreement for this tenant"))?;

    Ok(ApiResponse::success(agreement))
}

/// PATCH /agreements/:id/status - Transition an agreement (admin)
///
/// Accepting (`checked`) promotes the tenant to `member`.
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(caller): Extension<Authorized>,
    ApiJson(body): ApiJson<StatusRequest>,
) -> ApiResult<Agreement> {
    let id = parse_id(&id)?;
    let mut fields = FieldErrors::new();
    let Some(status) = fields.require_parsed::<AgreementStatus>("status", body.status) else {
        return Err(fields.into_error());
    };

    let agreement = state
        .store
        .set_agreement_status(id, status)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Agreement '{id}' not found")))?;

    if status == AgreementStatus::Checked {
        let promoted = state
            .store
            .set_user_role(&agreement.tenant_email, Role::Member)
            .await?;
        if promoted.is_none() {
            tracing::warn!(tenant = %agreement.tenant_email, "Accepted tenant has no user record to promote");
        }
    }

    tracing::info!(
        by = %caller.user.email,
        agreement = %agreement.id,
        status = %status.as_str(),
        "Agreement status updated"
    );
    Ok(ApiResponse::success(agreement))
}
