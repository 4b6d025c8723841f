use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

use super::UnknownVariant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgreementStatus {
    Pending,
    Checked,
    Rejected,
}

impl AgreementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgreementStatus::Pending => "pending",
            AgreementStatus::Checked => "checked",
            AgreementStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for AgreementStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AgreementStatus::Pending),
            "checked" => Ok(AgreementStatus::Checked),
            "rejected" => Ok(AgreementStatus::Rejected),
            other => Err(UnknownVariant {
                kind: "agreement status",
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for AgreementStatus {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A tenant's application for an apartment. One per tenant email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Agreement {
    pub id: Uuid,
    pub tenant_name: String,
    pub tenant_email: String,
    pub floor: i32,
    pub block: String,
    pub apartment_no: String,
    pub rent: Decimal,
    #[sqlx(try_from = "String")]
    pub status: AgreementStatus,
    pub created_at: DateTime<Utc>,
}

/// Validated input for a new agreement.
#[derive(Debug, Clone)]
pub struct NewAgreement {
    pub tenant_name: String,
    pub tenant_email: String,
    pub floor: i32,
    pub block: String,
    pub apartment_no: String,
    pub rent: Decimal,
}

impl From<NewAgreement> for Agreement {
    fn from(new: NewAgreement) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_name: new.tenant_name,
            tenant_email: new.tenant_email,
            floor: new.floor,
            block: new.block,
            apartment_no: new.apartment_no,
            rent: new.rent,
            status: AgreementStatus::Pending,
            created_at: Utc::now(),
        }
    }
}
