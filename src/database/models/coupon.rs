use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Coupon {
    pub id: Uuid,
    pub code: String,
    /// Percent off, 1..=100.
    pub discount: i32,
    pub description: String,
    pub available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Coupon {
    pub fn new(code: impl Into<String>, discount: i32, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            code: code.into(),
            discount,
            description: description.into(),
            available: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, patch: &CouponPatch) {
        if let Some(discount) = patch.discount {
            self.discount = discount;
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(available) = patch.available {
            self.available = available;
        }
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CouponPatch {
    pub discount: Option<i32>,
    pub description: Option<String>,
    pub available: Option<bool>,
}

impl CouponPatch {
    pub fn is_empty(&self) -> bool {
        self.discount.is_none() && self.description.is_none() && self.available.is_none()
    }
}
