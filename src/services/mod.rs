pub mod escalation;
pub mod payments;
pub mod reconciler;
pub mod roles;

pub use escalation::{issue_notice, NoticeOutcome, ESCALATION_THRESHOLD};
pub use payments::{PaymentError, PaymentGateway, PaymentIntent, StripeGateway};
pub use reconciler::{reconcile, ReconcileReport, Ready};
pub use roles::resolve_role;
