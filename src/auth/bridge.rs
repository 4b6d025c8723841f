//! Exchange of externally issued ID tokens for a local identity.
//!
//! Verification is delegated entirely to the provider: the ID token is sent
//! to the Identity Toolkit `accounts:lookup` endpoint, which only answers for
//! tokens it signed and that have not expired.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use super::Identity;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("external identity token rejected: {0}")]
    InvalidExternalToken(String),

    #[error("identity provider unreachable: {0}")]
    Upstream(String),
}

#[async_trait]
pub trait IdentityBridge: Send + Sync {
    async fn exchange(&self, external_token: &str) -> Result<Identity, BridgeError>;
}

/// Google Identity Toolkit (Firebase Auth) adapter.
pub struct IdentityToolkitBridge {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    email: Option<String>,
    display_name: Option<String>,
}

impl IdentityToolkitBridge {
    pub fn new(client: reqwest::Client, api_base: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn lookup_url(&self) -> String {
        format!("{}/v1/accounts:lookup", self.api_base)
    }
}

#[async_trait]
impl IdentityBridge for IdentityToolkitBridge {
    async fn exchange(&self, external_token: &str) -> Result<Identity, BridgeError> {
        let response = self
            .client
            .post(self.lookup_url())
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({ "idToken": external_token }))
            .send()
            .await
            .map_err(|e| BridgeError::Upstream(e.to_string()))?;

        let status = response.status();
        if status.is_client_error() {
            return Err(BridgeError::InvalidExternalToken(format!("provider answered {status}")));
        }
        if !status.is_success() {
            return Err(BridgeError::Upstream(format!("provider answered {status}")));
        }

        let body: LookupResponse = response
            .json()
            .await
            .map_err(|e| BridgeError::Upstream(e.to_string()))?;

        identity_from_lookup(body)
    }
}

fn identity_from_lookup(body: LookupResponse) -> Result<Identity, BridgeError> {
    let user = body
        .users
        .into_iter()
        .next()
        .ok_or_else(|| BridgeError::InvalidExternalToken("no account for token".to_string()))?;

    let email = user
        .email
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| BridgeError::InvalidExternalToken("account has no email".to_string()))?;

    Ok(Identity::new(email, user.display_name))
}
