use axum::extract::{Extension, Path, State};
use serde::{Deserialize, Serialize};

use super::validation::FieldErrors;
use crate::database::models::{Role, User};
use crate::database::UserRepository;
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, AuthUser, Authorized};
use crate::services::resolve_role;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub email: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RoleView {
    pub email: String,
    pub role: Role,
}

/// POST /users - Register a user at the baseline role
pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> ApiResult<User> {
    let mut fields = FieldErrors::new();
    let email = fields.require_text("email", body.email);
    let name = fields.require_text("name", body.name);
    let (Some(email), Some(name)) = (email, name) else {
        return Err(fields.into_error());
    };

    let user = User::new(email, name);
    state.store.insert_user(&user).await?;

    tracing::info!(email = %user.email, "User registered");
    Ok(ApiResponse::created(user))
}

/// GET /users - All users (admin)
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<User>> {
    Ok(ApiResponse::success(state.store.list_users().await?))
}

/// GET /users/:email - One user (self or admin)
pub async fn show(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Extension(caller): Extension<Authorized>,
) -> ApiResult<User> {
    caller.ensure_self_or_admin(&email)?;

    let user = state
        .store
        .find_user(&email)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User '{email}' not found")))?;

    Ok(ApiResponse::success(user))
}

/// PATCH /users/:email - Set a user's role (admin)
pub async fn update_role(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Extension(caller): Extension<Authorized>,
    ApiJson(body): ApiJson<RoleRequest>,
) -> ApiResult<User> {
    let mut fields = FieldErrors::new();
    let Some(role) = fields.require_parsed::<Role>("role", body.role) else {
        return Err(fields.into_error());
    };

    apply_role(&state, &caller, &email, role).await
}

/// PATCH /users/role - Set a user's role by email in the body (admin)
pub async fn update_role_by_body(
    State(state): State<AppState>,
    Extension(caller): Extension<Authorized>,
    ApiJson(body): ApiJson<RoleRequest>,
) -> ApiResult<User> {
    let mut fields = FieldErrors::new();
    let email = fields.require_text("email", body.email);
    let role = fields.require_parsed::<Role>("role", body.role);
    let (Some(email), Some(role)) = (email, role) else {
        return Err(fields.into_error());
    };

    apply_role(&state, &caller, &email, role).await
}

/// GET /users/role/:email - Current role, `user` when unregistered
pub async fn role_of(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Extension(_session): Extension<AuthUser>,
) -> ApiResult<RoleView> {
    let role = resolve_role(state.store.as_ref(), &email).await?;
    Ok(ApiResponse::success(RoleView { email, role }))
}

async fn apply_role(state: &AppState, caller: &Authorized, email: &str, role: Role) -> ApiResult<User> {
    let user = state
        .store
        .set_user_role(email, role)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User '{email}' not found")))?;

    tracing::info!(by = %caller.user.email, email = %email, role = %role, "Role updated");
    Ok(ApiResponse::success(user))
}
