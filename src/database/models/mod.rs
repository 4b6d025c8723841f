pub mod agreement;
pub mod announcement;
pub mod apartment;
pub mod building;
pub mod coupon;
pub mod notice;
pub mod payment;
pub mod user;

pub use agreement::{Agreement, AgreementStatus, NewAgreement};
pub use announcement::Announcement;
pub use apartment::{Apartment, ApartmentPage, ApartmentQuery};
pub use building::Building;
pub use coupon::{Coupon, CouponPatch};
pub use notice::{Notice, NoticeStatus};
pub use payment::Payment;
pub use user::{Role, User};

/// Error raised when a stored or submitted enum value is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}
