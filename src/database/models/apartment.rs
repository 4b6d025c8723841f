use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Apartment {
    pub id: Uuid,
    pub image: String,
    pub floor: i32,
    pub block: String,
    pub apartment_no: String,
    pub rent: Decimal,
}

/// Listing filter with 1-based paging.
#[derive(Debug, Clone, PartialEq)]
pub struct ApartmentQuery {
    pub page: u32,
    pub limit: u32,
    pub min_rent: Option<Decimal>,
    pub max_rent: Option<Decimal>,
}

impl ApartmentQuery {
    pub const DEFAULT_LIMIT: u32 = 6;
    pub const MAX_LIMIT: u32 = 50;

    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(Self::DEFAULT_LIMIT).clamp(1, Self::MAX_LIMIT),
            min_rent: None,
            max_rent: None,
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    pub fn matches(&self, apartment: &Apartment) -> bool {
        self.min_rent.map_or(true, |min| apartment.rent >= min)
            && self.max_rent.map_or(true, |max| apartment.rent <= max)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ApartmentPage {
    pub items: Vec<Apartment>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}
