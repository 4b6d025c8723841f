use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use cookie::Cookie;

use crate::auth::Identity;
use crate::error::ApiError;
use crate::state::AppState;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "token";

/// Authenticated caller extracted from the session token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub email: String,
    pub name: Option<String>,
}

impl From<Identity> for AuthUser {
    fn from(identity: Identity) -> Self {
        Self {
            email: identity.email,
            name: identity.name,
        }
    }
}

/// Session middleware: no credential is 401, a credential that fails
/// verification (bad signature, malformed, expired) is 403.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(request.headers())
        .ok_or_else(|| ApiError::unauthorized("Unauthorized access"))?;

    let identity = state.tokens.verify(&token)?;

    request.extensions_mut().insert(AuthUser::from(identity));

    Ok(next.run(request).await)
}

/// Session cookie first, then `Authorization: Bearer`.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    cookie_token(headers).or_else(|| bearer_token(headers))
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == SESSION_COOKIE && !cookie.value_trimmed().is_empty())
        .map(|cookie| cookie.value_trimmed().to_string())
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}
