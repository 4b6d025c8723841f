use axum::extract::{Extension, Path, State};
use serde::Deserialize;

use super::validation::FieldErrors;
use crate::database::models::Notice;
use crate::database::NoticeRepository;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, Authorized};
use crate::services::{issue_notice, NoticeOutcome};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NoticeRequest {
    pub tenant_email: Option<String>,
    pub apartment: Option<String>,
    pub reason: Option<String>,
}

/// POST /notices/issue - Issue a notice, revoking the tenancy at the threshold (admin)
pub async fn issue(
    State(state): State<AppState>,
    Extension(caller): Extension<Authorized>,
    ApiJson(body): ApiJson<NoticeRequest>,
) -> ApiResult<NoticeOutcome> {
    let mut fields = FieldErrors::new();
    let tenant_email = fields.require_text("tenant_email", body.tenant_email);
    let apartment = fields.require_text("apartment", body.apartment);
    let reason = fields.require_text("reason", body.reason);
    let (Some(tenant_email), Some(apartment), Some(reason)) = (tenant_email, apartment, reason) else {
        return Err(fields.into_error());
    };

    let outcome = issue_notice(state.store.as_ref(), &tenant_email, &apartment, &reason).await?;

    tracing::info!(by = %caller.user.email, tenant = %tenant_email, revoked = outcome.revoked, "Notice issued");
    Ok(ApiResponse::created(outcome))
}

/// GET /notices/user/:email - A tenant's notices, newest first (self or admin)
pub async fn for_tenant(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Extension(caller): Extension<Authorized>,
) -> ApiResult<Vec<Notice>> {
    caller.ensure_self_or_admin(&email)?;
    Ok(ApiResponse::success(state.store.list_notices_for(&email).await?))
}
