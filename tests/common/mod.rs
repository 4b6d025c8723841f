#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use towertrack_api::auth::{Identity, TokenCodec};
use towertrack_api::config::AppConfig;
use towertrack_api::database::models::{Role, User};
use towertrack_api::database::{MemoryStore, UserRepository};
use towertrack_api::services::reconcile;
use towertrack_api::{app, AppState};

pub const ADMIN: &str = "admin@towertrack.test";

/// In-process application over a fresh `MemoryStore`.
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub tokens: Arc<TokenCodec>,
    router: Router,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestApp {
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(|state| state).await
    }

    /// Spawn with extra wiring, e.g. a fake bridge or payment gateway.
    pub async fn spawn_with(customize: impl FnOnce(AppState) -> AppState) -> Result<Self> {
        let store = Arc::new(MemoryStore::new());
        let (ready, _report) = reconcile(store.as_ref()).await?;

        let state = customize(AppState::new(AppConfig::for_tests(), store.clone())?);
        let tokens = state.tokens.clone();

        Ok(Self {
            store,
            tokens,
            router: app(state, ready),
        })
    }

    /// Register `email` with `role` and return a bearer token for it.
    pub async fn login_as(&self, email: &str, role: Role) -> Result<String> {
        if self.store.find_user(email).await?.is_none() {
            self.store.insert_user(&User::new(email, "Test User")).await?;
        }
        self.store.set_user_role(email, role).await?;
        self.token_for(email)
    }

    /// A valid token for an identity that may have no user record.
    pub fn token_for(&self, email: &str) -> Result<String> {
        Ok(self.tokens.issue(&Identity::new(email, None))?.token)
    }

    pub async fn admin(&self) -> Result<String> {
        self.login_as(ADMIN, Role::Admin).await
    }

    pub async fn send(&self, request: Request<Body>) -> Result<TestResponse> {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .context("router failed")?;

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).context("response body is not JSON")?
        };

        Ok(TestResponse { status, headers, body })
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };
        self.send(request).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Result<TestResponse> {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> Result<TestResponse> {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: Option<&str>, body: Value) -> Result<TestResponse> {
        self.request(Method::PATCH, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> Result<TestResponse> {
        self.request(Method::DELETE, uri, token, None).await
    }
}

impl TestResponse {
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    pub fn code(&self) -> &str {
        self.body["code"].as_str().unwrap_or_default()
    }

    pub fn set_cookie(&self) -> Option<&str> {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
    }
}

/// A complete agreement application body.
pub fn agreement_body() -> Value {
    serde_json::json!({
        "tenant_name": "Avery Tenant",
        "floor": 4,
        "block": "C",
        "apartment_no": "C-402",
        "rent": 1450
    })
}
