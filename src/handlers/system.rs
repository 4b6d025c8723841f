use axum::extract::State;
use serde_json::{json, Value};

use crate::database::Store;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET / - Service information
pub async fn root(State(state): State<AppState>) -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "name": "TowerTrack API",
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.config.environment,
        "endpoints": {
            "session": "/jwt, /logout (public)",
            "listings": "/apartments, /buildings (public)",
            "users": "/users[/:email], /users/role[/:email]",
            "agreements": "/agreements[/member/:email | /:id/status]",
            "coupons": "/coupons[/:id], /validate-coupon",
            "announcements": "/announcements",
            "payments": "/create-payment-intent, /payments[/user/:email]",
            "notices": "/notices/issue, /notices/user/:email",
        }
    })))
}

/// GET /health - Store connectivity
pub async fn health(State(state): State<AppState>) -> ApiResult<Value> {
    if let Err(e) = state.store.ping().await {
        tracing::error!("Health check failed: {}", e);
        return Err(ApiError::service_unavailable("database unavailable"));
    }

    Ok(ApiResponse::success(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
        "database": state.store.backend(),
    })))
}
