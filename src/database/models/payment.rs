use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A completed rent payment. Only records the processor already confirmed
/// are stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub month: String,
    pub amount: Decimal,
    pub discount: i32,
    pub transaction_id: String,
    pub floor: i32,
    pub block: String,
    pub apartment_no: String,
    pub coupon_code: Option<String>,
    pub paid_at: DateTime<Utc>,
}
