use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use cookie::{time::Duration, Cookie};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::validation::FieldErrors;
use crate::auth::Identity;
use crate::config::SecurityConfig;
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiResponse, SESSION_COOKIE};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    /// Token issued by the external identity provider.
    pub id_token: Option<String>,
    /// Direct identity, accepted only when enabled in configuration.
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionIssued {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// POST /jwt - Issue a session token as an HttpOnly cookie
///
/// Accepts either `{"id_token": "..."}`, exchanged through the identity
/// provider, or `{"email": "...", "name": "..."}` when direct identity is
/// allowed. The token is also returned in the body for bearer clients.
pub async fn issue(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SessionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let identity = resolve_identity(&state, body).await?;
    let issued = state.tokens.issue(&identity)?;

    tracing::info!(email = %identity.email, "Session issued");

    let cookie = session_cookie(
        &state.config.security,
        &issued.token,
        state.tokens.validity().num_seconds(),
    );
    let data = SessionIssued {
        email: identity.email,
        name: identity.name,
        token: issued.token,
        expires_at: issued.expires_at,
    };

    Ok(([(header::SET_COOKIE, cookie.to_string())], ApiResponse::success(data)))
}

/// POST /logout - Clear the session cookie
///
/// Tokens are stateless; one already copied elsewhere stays valid until it
/// expires.
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    let cookie = session_cookie(&state.config.security, "", 0);
    ([(header::SET_COOKIE, cookie.to_string())], ApiResponse::success(json!({ "logged_out": true })))
}

async fn resolve_identity(state: &AppState, body: SessionRequest) -> Result<Identity, ApiError> {
    if let Some(id_token) = body.id_token.filter(|t| !t.trim().is_empty()) {
        let bridge = state
            .bridge
            .as_ref()
            .ok_or_else(|| ApiError::service_unavailable("Identity provider is not configured"))?;
        return Ok(bridge.exchange(&id_token).await?);
    }

    if !state.config.security.allow_direct_identity {
        let mut fields = FieldErrors::new();
        fields.reject("id_token", "This field is required");
        return Err(fields.into_error());
    }

    let mut fields = FieldErrors::new();
    let Some(email) = fields.require_text("email", body.email) else {
        return Err(fields.into_error());
    };
    let name = body.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());

    Ok(Identity::new(email, name))
}

fn session_cookie(security: &SecurityConfig, token: &str, max_age: i64) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token.to_string()))
        .http_only(true)
        .path("/")
        .max_age(Duration::seconds(max_age))
        .same_site(security.cookie_same_site)
        .secure(security.cookie_secure)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use cookie::SameSite;

    #[test]
    fn cookie_carries_configured_flags() {
        let mut security = AppConfig::for_tests().security;
        security.cookie_secure = true;
        security.cookie_same_site = SameSite::None;

        let cookie = session_cookie(&security, "abc", 3600);
        assert_eq!(cookie.name(), "token");
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::hours(1)));
        assert_eq!(cookie.same_site(), Some(SameSite::None));
        assert_eq!(cookie.secure(), Some(true));
    }

    #[test]
    fn clearing_cookie_expires_it() {
        let mut security = AppConfig::for_tests().security;
        security.cookie_secure = false;
        security.cookie_same_site = SameSite::Strict;

        let header = session_cookie(&security, "", 0).to_string();
        let parsed = Cookie::parse(header.as_str()).expect("set-cookie parses");
        assert_eq!(parsed.value(), "");
        assert_eq!(parsed.max_age(), Some(Duration::ZERO));
        assert_eq!(parsed.same_site(), Some(SameSite::Strict));
        assert!(!header.contains("Secure"));
    }
}
