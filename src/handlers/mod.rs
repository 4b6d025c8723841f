// handlers/mod.rs - one module per resource
//
// Guards are not applied here; `routes` wraps each group in the session and
// role middleware it needs.
pub mod agreements;
pub mod announcements;
pub mod coupons;
pub mod listings;
pub mod notices;
pub mod payments;
pub mod session;
pub mod system;
pub mod users;
pub mod validation;
