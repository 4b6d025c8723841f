use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::auth::AuthUser;
use crate::database::models::Role;
use crate::error::ApiError;
use crate::services::roles::{is_permitted, resolve_role};
use crate::state::AppState;

/// State for `require_role`: the app state plus the route group's allow-list.
#[derive(Clone)]
pub struct RoleGate {
    state: AppState,
    allowed: &'static [Role],
}

impl RoleGate {
    pub fn new(state: AppState, allowed: &'static [Role]) -> Self {
        Self { state, allowed }
    }
}

/// Caller whose current role passed the route's allow-list.
#[derive(Clone, Debug)]
pub struct Authorized {
    pub user: AuthUser,
    pub role: Role,
}

impl Authorized {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Owner-scoped reads: the path email must be the caller's own unless
    /// the caller is an admin.
    pub fn ensure_self_or_admin(&self, email: &str) -> Result<(), ApiError> {
        if self.is_admin() || self.user.email == email {
            Ok(())
        } else {
            Err(ApiError::forbidden("Forbidden access"))
        }
    }
}

/// Role middleware. Runs after `require_session` and resolves the role from
/// the store on every request, so role changes apply without a new token.
pub async fn require_role(
    State(gate): State<RoleGate>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("Unauthorized access"))?;

    let role = resolve_role(gate.state.store.as_ref(), &user.email).await?;
    if !is_permitted(role, gate.allowed) {
        tracing::warn!(
            email = %user.email,
            role = %role,
            path = %request.uri().path(),
            "Role not permitted for route"
        );
        return Err(ApiError::forbidden("Forbidden access"));
    }

    request.extensions_mut().insert(Authorized { user, role });

    Ok(next.run(request).await)
}
