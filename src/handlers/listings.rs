use axum::extract::{Query, State};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::database::models::{ApartmentPage, ApartmentQuery, Building};
use crate::database::ListingRepository;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ApartmentParams {
    /// 1-based page number
    pub page: Option<u32>,
    /// Page size, capped at `ApartmentQuery::MAX_LIMIT`
    pub limit: Option<u32>,
    pub min_rent: Option<Decimal>,
    pub max_rent: Option<Decimal>,
}

/// GET /apartments - Paginated apartment listing with optional rent range
pub async fn apartments(
    State(state): State<AppState>,
    Query(params): Query<ApartmentParams>,
) -> ApiResult<ApartmentPage> {
    if let (Some(min), Some(max)) = (params.min_rent, params.max_rent) {
        if min > max {
            return Err(ApiError::bad_request("min_rent must not exceed max_rent"));
        }
    }

    let mut query = ApartmentQuery::new(params.page, params.limit);
    query.min_rent = params.min_rent;
    query.max_rent = params.max_rent;

    let page = state.store.list_apartments(&query).await?;
    Ok(ApiResponse::success(page))
}

/// GET /buildings
pub async fn buildings(State(state): State<AppState>) -> ApiResult<Vec<Building>> {
    Ok(ApiResponse::success(state.store.list_buildings().await?))
}
