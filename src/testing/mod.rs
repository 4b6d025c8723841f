use rust_decimal::Decimal;

use crate::database::models::{Agreement, NewAgreement};

/// A pending agreement for `email` with fixed apartment details.
pub fn agreement_for(email: &str) -> Agreement {
    Agreement::from(NewAgreement {
        tenant_name: "Test Tenant".to_string(),
        tenant_email: email.to_string(),
        floor: 4,
        block: "C".to_string(),
        apartment_no: "C-402".to_string(),
        rent: Decimal::new(1450, 0),
    })
}
