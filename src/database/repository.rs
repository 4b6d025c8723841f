//! Persistence ports. Handlers and services only ever see these traits;
//! `PgStore` and `MemoryStore` are the adapters.

use async_trait::async_trait;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Agreement, AgreementStatus, Announcement, Apartment, ApartmentPage, ApartmentQuery, Building,
    Coupon, CouponPatch, Notice, Payment, Role, User,
};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    /// Fails with `Conflict` when the email is already registered.
    async fn insert_user(&self, user: &User) -> Result<(), DatabaseError>;

    async fn list_users(&self) -> Result<Vec<User>, DatabaseError>;

    /// Returns the updated record, or `None` when no user has that email.
    async fn set_user_role(&self, email: &str, role: Role) -> Result<Option<User>, DatabaseError>;
}

#[async_trait]
pub trait AgreementRepository: Send + Sync {
    /// Fails with `Conflict` once the tenant-email uniqueness constraint is
    /// installed and the tenant already has an agreement.
    async fn insert_agreement(&self, agreement: &Agreement) -> Result<(), DatabaseError>;

    async fn find_agreement_by_email(&self, email: &str) -> Result<Option<Agreement>, DatabaseError>;

    /// Newest first.
    async fn list_agreements(
        &self,
        status: Option<AgreementStatus>,
    ) -> Result<Vec<Agreement>, DatabaseError>;

    async fn set_agreement_status(
        &self,
        id: Uuid,
        status: AgreementStatus,
    ) -> Result<Option<Agreement>, DatabaseError>;

    async fn delete_agreement_by_email(&self, email: &str) -> Result<u64, DatabaseError>;

    async fn delete_agreements(&self, ids: &[Uuid]) -> Result<u64, DatabaseError>;

    /// Idempotent. Callers must remove duplicates first.
    async fn ensure_agreement_email_unique(&self) -> Result<(), DatabaseError>;
}

#[async_trait]
pub trait NoticeRepository: Send + Sync {
    async fn count_active_notices(&self, email: &str) -> Result<i64, DatabaseError>;

    async fn insert_notice(&self, notice: &Notice) -> Result<(), DatabaseError>;

    /// Newest first.
    async fn list_notices_for(&self, email: &str) -> Result<Vec<Notice>, DatabaseError>;
}

#[async_trait]
pub trait CouponRepository: Send + Sync {
    /// Fails with `Conflict` on a duplicate code.
    async fn insert_coupon(&self, coupon: &Coupon) -> Result<(), DatabaseError>;

    async fn list_coupons(&self) -> Result<Vec<Coupon>, DatabaseError>;

    async fn find_coupon_by_code(&self, code: &str) -> Result<Option<Coupon>, DatabaseError>;

    async fn update_coupon(
        &self,
        id: Uuid,
        patch: &CouponPatch,
    ) -> Result<Option<Coupon>, DatabaseError>;

    async fn delete_coupon(&self, id: Uuid) -> Result<bool, DatabaseError>;
}

#[async_trait]
pub trait AnnouncementRepository: Send + Sync {
    async fn insert_announcement(&self, announcement: &Announcement) -> Result<(), DatabaseError>;

    /// Newest first.
    async fn list_announcements(&self) -> Result<Vec<Announcement>, DatabaseError>;
}

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn insert_payment(&self, payment: &Payment) -> Result<(), DatabaseError>;

    async fn list_payments(&self) -> Result<Vec<Payment>, DatabaseError>;

    async fn list_payments_for(&self, email: &str) -> Result<Vec<Payment>, DatabaseError>;
}

#[async_trait]
pub trait ListingRepository: Send + Sync {
    async fn list_apartments(&self, query: &ApartmentQuery) -> Result<ApartmentPage, DatabaseError>;

    async fn insert_apartment(&self, apartment: &Apartment) -> Result<(), DatabaseError>;

    async fn list_buildings(&self) -> Result<Vec<Building>, DatabaseError>;

    async fn insert_building(&self, building: &Building) -> Result<(), DatabaseError>;
}

/// The full persistence context handed to handlers through `AppState`.
#[async_trait]
pub trait Store:
    UserRepository
    + AgreementRepository
    + NoticeRepository
    + CouponRepository
    + AnnouncementRepository
    + PaymentRepository
    + ListingRepository
{
    /// Short name for logs and the health endpoint.
    fn backend(&self) -> &'static str;

    async fn ping(&self) -> Result<(), DatabaseError>;
}
