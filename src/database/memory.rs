use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Agreement, AgreementStatus, Announcement, Apartment, ApartmentPage, ApartmentQuery, Building,
    Coupon, CouponPatch, Notice, NoticeStatus, Payment, Role, User,
};
use crate::database::repository::{
    AgreementRepository, AnnouncementRepository, CouponRepository, ListingRepository,
    NoticeRepository, PaymentRepository, Store, UserRepository,
};

#[derive(Default)]
struct Collections {
    users: HashMap<String, User>,
    agreements: Vec<Agreement>,
    agreement_email_unique: bool,
    notices: Vec<Notice>,
    coupons: Vec<Coupon>,
    announcements: Vec<Announcement>,
    payments: Vec<Payment>,
    apartments: Vec<Apartment>,
    buildings: Vec<Building>,
}

/// Process-local store for development runs without `DATABASE_URL` and for
/// tests. Mirrors the PostgreSQL constraints: unique user email, unique
/// coupon code, and the agreement email index once installed.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first<T, K: Ord>(mut items: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
    items
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_user(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        Ok(self.inner.read().await.users.get(email).cloned())
    }

    async fn insert_user(&self, user: &User) -> Result<(), DatabaseError> {
        let mut inner = self.inner.write().await;
        if inner.users.contains_key(&user.email) {
            return Err(DatabaseError::Conflict(format!("user '{}' already exists", user.email)));
        }
        inner.users.insert(user.email.clone(), user.clone());
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>, DatabaseError> {
        let users = self.inner.read().await.users.values().cloned().collect();
        Ok(newest_first(users, |u: &User| u.created_at))
    }

    async fn set_user_role(&self, email: &str, role: Role) -> Result<Option<User>, DatabaseError> {
        let mut inner = self.inner.write().await;
        Ok(inner.users.get_mut(email).map(|user| {
            user.role = role;
            user.clone()
        }))
    }
}

#[async_trait]
impl AgreementRepository for MemoryStore {
    async fn insert_agreement(&self, agreement: &Agreement) -> Result<(), DatabaseError> {
        let mut inner = self.inner.write().await;
        if inner.agreement_email_unique
            && inner
                .agreements
                .iter()
                .any(|a| a.tenant_email == agreement.tenant_email)
        {
            return Err(DatabaseError::Conflict(format!(
                "an agreement for '{}' already exists",
                agreement.tenant_email
            )));
        }
        inner.agreements.push(agreement.clone());
        Ok(())
    }

    async fn find_agreement_by_email(&self, email: &str) -> Result<Option<Agreement>, DatabaseError> {
        let inner = self.inner.read().await;
        Ok(inner.agreements.iter().find(|a| a.tenant_email == email).cloned())
    }

    async fn list_agreements(
        &self,
        status: Option<AgreementStatus>,
    ) -> Result<Vec<Agreement>, DatabaseError> {
        let inner = self.inner.read().await;
        let agreements = inner
            .agreements
            .iter()
            .filter(|a| status.map_or(true, |s| a.status == s))
            .cloned()
            .collect();
        Ok(newest_first(agreements, |a: &Agreement| a.created_at))
    }

    async fn set_agreement_status(
        &self,
        id: Uuid,
        status: AgreementStatus,
    ) -> Result<Option<Agreement>, DatabaseError> {
        let mut inner = self.inner.write().await;
        Ok(inner.agreements.iter_mut().find(|a| a.id == id).map(|agreement| {
            agreement.status = status;
            agreement.clone()
        }))
    }

    async fn delete_agreement_by_email(&self, email: &str) -> Result<u64, DatabaseError> {
        let mut inner = self.inner.write().await;
        let before = inner.agreements.len();
        inner.agreements.retain(|a| a.tenant_email != email);
        Ok((before - inner.agreements.len()) as u64)
    }

    async fn delete_agreements(&self, ids: &[Uuid]) -> Result<u64, DatabaseError> {
        let mut inner = self.inner.write().await;
        let before = inner.agreements.len();
        inner.agreements.retain(|a| !ids.contains(&a.id));
        Ok((before - inner.agreements.len()) as u64)
    }

    async fn ensure_agreement_email_unique(&self) -> Result<(), DatabaseError> {
        let mut inner = self.inner.write().await;
        let has_duplicates = {
            let mut seen = HashSet::new();
            !inner.agreements.iter().all(|a| seen.insert(a.tenant_email.as_str()))
        };
        if has_duplicates {
            return Err(DatabaseError::QueryError(
                "could not create unique index: duplicate tenant_email values exist".to_string(),
            ));
        }
        inner.agreement_email_unique = true;
        Ok(())
    }
}

#[async_trait]
impl NoticeRepository for MemoryStore {
    async fn count_active_notices(&self, email: &str) -> Result<i64, DatabaseError> {
        let inner = self.inner.read().await;
        let count = inner
            .notices
            .iter()
            .filter(|n| n.tenant_email == email && n.status == NoticeStatus::Active)
            .count();
        Ok(count as i64)
    }

    async fn insert_notice(&self, notice: &Notice) -> Result<(), DatabaseError> {
        self.inner.write().await.notices.push(notice.clone());
        Ok(())
    }

    async fn list_notices_for(&self, email: &str) -> Result<Vec<Notice>, DatabaseError> {
        let inner = self.inner.read().await;
        let notices = inner
            .notices
            .iter()
            .filter(|n| n.tenant_email == email)
            .cloned()
            .collect();
        Ok(newest_first(notices, |n: &Notice| (n.issued_at, n.count)))
    }
}

#[async_trait]
impl CouponRepository for MemoryStore {
    async fn insert_coupon(&self, coupon: &Coupon) -> Result<(), DatabaseError> {
        let mut inner = self.inner.write().await;
        if inner.coupons.iter().any(|c| c.code == coupon.code) {
            return Err(DatabaseError::Conflict(format!(
                "coupon code '{}' already exists",
                coupon.code
            )));
        }
        inner.coupons.push(coupon.clone());
        Ok(())
    }

    async fn list_coupons(&self) -> Result<Vec<Coupon>, DatabaseError> {
        let coupons = self.inner.read().await.coupons.clone();
        Ok(newest_first(coupons, |c: &Coupon| c.created_at))
    }

    async fn find_coupon_by_code(&self, code: &str) -> Result<Option<Coupon>, DatabaseError> {
        let inner = self.inner.read().await;
        Ok(inner.coupons.iter().find(|c| c.code == code).cloned())
    }

    async fn update_coupon(
        &self,
        id: Uuid,
        patch: &CouponPatch,
    ) -> Result<Option<Coupon>, DatabaseError> {
        let mut inner = self.inner.write().await;
        Ok(inner.coupons.iter_mut().find(|c| c.id == id).map(|coupon| {
            coupon.apply(patch);
            coupon.clone()
        }))
    }

    async fn delete_coupon(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let mut inner = self.inner.write().await;
        let before = inner.coupons.len();
        inner.coupons.retain(|c| c.id != id);
        Ok(inner.coupons.len() < before)
    }
}

#[async_trait]
impl AnnouncementRepository for MemoryStore {
    async fn insert_announcement(&self, announcement: &Announcement) -> Result<(), DatabaseError> {
        self.inner.write().await.announcements.push(announcement.clone());
        Ok(())
    }

    async fn list_announcements(&self) -> Result<Vec<Announcement>, DatabaseError> {
        let announcements = self.inner.read().await.announcements.clone();
        Ok(newest_first(announcements, |a: &Announcement| a.created_at))
    }
}

#[async_trait]
impl PaymentRepository for MemoryStore {
    async fn insert_payment(&self, payment: &Payment) -> Result<(), DatabaseError> {
        self.inner.write().await.payments.push(payment.clone());
        Ok(())
    }

    async fn list_payments(&self) -> Result<Vec<Payment>, DatabaseError> {
        let payments = self.inner.read().await.payments.clone();
        Ok(newest_first(payments, |p: &Payment| p.paid_at))
    }

    async fn list_payments_for(&self, email: &str) -> Result<Vec<Payment>, DatabaseError> {
        let inner = self.inner.read().await;
        let payments = inner.payments.iter().filter(|p| p.email == email).cloned().collect();
        Ok(newest_first(payments, |p: &Payment| p.paid_at))
    }
}

#[async_trait]
impl ListingRepository for MemoryStore {
    async fn list_apartments(&self, query: &ApartmentQuery) -> Result<ApartmentPage, DatabaseError> {
        let inner = self.inner.read().await;
        let mut matching: Vec<&Apartment> =
            inner.apartments.iter().filter(|a| query.matches(a)).collect();
        matching.sort_by(|a, b| (&a.block, &a.apartment_no).cmp(&(&b.block, &b.apartment_no)));

        let total = matching.len() as u64;
        let offset = usize::try_from(query.offset()).unwrap_or(usize::MAX);
        let items = matching
            .into_iter()
            .skip(offset)
            .take(query.limit as usize)
            .cloned()
            .collect();

        Ok(ApartmentPage {
            items,
            total,
            page: query.page,
            limit: query.limit,
        })
    }

    async fn insert_apartment(&self, apartment: &Apartment) -> Result<(), DatabaseError> {
        self.inner.write().await.apartments.push(apartment.clone());
        Ok(())
    }

    async fn list_buildings(&self) -> Result<Vec<Building>, DatabaseError> {
        let mut buildings = self.inner.read().await.buildings.clone();
        buildings.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(buildings)
    }

    async fn insert_building(&self, building: &Building) -> Result<(), DatabaseError> {
        self.inner.write().await.buildings.push(building.clone());
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
