use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::UnknownVariant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeStatus {
    Active,
}

impl NoticeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeStatus::Active => "active",
        }
    }
}

impl TryFrom<String> for NoticeStatus {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "active" => Ok(NoticeStatus::Active),
            _ => Err(UnknownVariant {
                kind: "notice status",
                value,
            }),
        }
    }
}

/// A warning issued to a tenant. `count` is the tenant's running total at
/// the time of issuance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Notice {
    pub id: Uuid,
    pub tenant_email: String,
    pub apartment: String,
    pub reason: String,
    pub count: i64,
    #[sqlx(try_from = "String")]
    pub status: NoticeStatus,
    pub issued_at: DateTime<Utc>,
}

impl Notice {
    pub fn active(
        tenant_email: impl Into<String>,
        apartment: impl Into<String>,
        reason: impl Into<String>,
        count: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_email: tenant_email.into(),
            apartment: apartment.into(),
            reason: reason.into(),
            count,
            status: NoticeStatus::Active,
            issued_at: Utc::now(),
        }
    }
}
