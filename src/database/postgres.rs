use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{
    Agreement, AgreementStatus, Announcement, Apartment, ApartmentPage, ApartmentQuery, Building,
    Coupon, CouponPatch, Notice, NoticeStatus, Payment, Role, User,
};
use crate::database::repository::{
    AgreementRepository, AnnouncementRepository, CouponRepository, ListingRepository,
    NoticeRepository, PaymentRepository, Store, UserRepository,
};

/// Tables are created on boot. The agreements email index is left to the
/// reconciler so pre-existing duplicates can be collapsed first.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        email       TEXT PRIMARY KEY,
        name        TEXT NOT NULL,
        role        TEXT NOT NULL DEFAULT 'user',
        created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS agreements (
        id            UUID PRIMARY KEY,
        tenant_name   TEXT NOT NULL,
        tenant_email  TEXT NOT NULL,
        floor         INTEGER NOT NULL,
        block         TEXT NOT NULL,
        apartment_no  TEXT NOT NULL,
        rent          NUMERIC NOT NULL,
        status        TEXT NOT NULL DEFAULT 'pending',
        created_at    TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS notices (
        id            UUID PRIMARY KEY,
        tenant_email  TEXT NOT NULL,
        apartment     TEXT NOT NULL,
        reason        TEXT NOT NULL,
        count         BIGINT NOT NULL,
        status        TEXT NOT NULL DEFAULT 'active',
        issued_at     TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS notices_tenant_email_idx ON notices (tenant_email, status)",
    r#"
    CREATE TABLE IF NOT EXISTS coupons (
        id           UUID PRIMARY KEY,
        code         TEXT NOT NULL UNIQUE,
        discount     INTEGER NOT NULL,
        description  TEXT NOT NULL,
        available    BOOLEAN NOT NULL DEFAULT true,
        created_at   TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at   TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS announcements (
        id           UUID PRIMARY KEY,
        title        TEXT NOT NULL,
        description  TEXT NOT NULL,
        created_at   TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS payments (
        id              UUID PRIMARY KEY,
        email           TEXT NOT NULL,
        name            TEXT NOT NULL,
        month           TEXT NOT NULL,
        amount          NUMERIC NOT NULL,
        discount        INTEGER NOT NULL DEFAULT 0,
        transaction_id  TEXT NOT NULL,
        floor           INTEGER NOT NULL,
        block           TEXT NOT NULL,
        apartment_no    TEXT NOT NULL,
        coupon_code     TEXT,
        paid_at         TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS apartments (
        id            UUID PRIMARY KEY,
        image         TEXT NOT NULL,
        floor         INTEGER NOT NULL,
        block         TEXT NOT NULL,
        apartment_no  TEXT NOT NULL,
        rent          NUMERIC NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS buildings (
        id           UUID PRIMARY KEY,
        name         TEXT NOT NULL,
        address      TEXT NOT NULL,
        floors       INTEGER NOT NULL,
        description  TEXT NOT NULL,
        image        TEXT NOT NULL
    )
    "#,
];

const AGREEMENT_COLUMNS: &str =
    "id, tenant_name, tenant_email, floor, block, apartment_no, rent, status, created_at";
const NOTICE_COLUMNS: &str = "id, tenant_email, apartment, reason, count, status, issued_at";
const COUPON_COLUMNS: &str = "id, code, discount, description, available, created_at, updated_at";
const PAYMENT_COLUMNS: &str = "id, email, name, month, amount, discount, transaction_id, floor, block, apartment_no, coupon_code, paid_at";

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn ensure_schema(&self) -> Result<(), DatabaseError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("Database schema ensured ({} statements)", SCHEMA.len());
        Ok(())
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn find_user(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT email, name, role, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn insert_user(&self, user: &User) -> Result<(), DatabaseError> {
        sqlx::query("INSERT INTO users (email, name, role, created_at) VALUES ($1, $2, $3, $4)")
            .bind(&user.email)
            .bind(&user.name)
            .bind(user.role.as_str())
            .bind(user.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::unique_violation(e, format!("user '{}' already exists", user.email)))?;
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>, DatabaseError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT email, name, role, created_at FROM users ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn set_user_role(&self, email: &str, role: Role) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET role = $2 WHERE email = $1 RETURNING email, name, role, created_at",
        )
        .bind(email)
        .bind(role.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }
}

#[async_trait]
impl AgreementRepository for PgStore {
    async fn insert_agreement(&self, agreement: &Agreement) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO agreements (id, tenant_name, tenant_email, floor, block, apartment_no, rent, status, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(agreement.id)
        .bind(&agreement.tenant_name)
        .bind(&agreement.tenant_email)
        .bind(agreement.floor)
        .bind(&agreement.block)
        .bind(&agreement.apartment_no)
        .bind(agreement.rent)
        .bind(agreement.status.as_str())
        .bind(agreement.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DatabaseError::unique_violation(
                e,
                format!("an agreement for '{}' already exists", agreement.tenant_email),
            )
        })?;
        Ok(())
    }

    async fn find_agreement_by_email(&self, email: &str) -> Result<Option<Agreement>, DatabaseError> {
        let sql = format!(
            "SELECT {AGREEMENT_COLUMNS} FROM agreements WHERE tenant_email = $1 ORDER BY created_at LIMIT 1"
        );
        let agreement = sqlx::query_as::<_, Agreement>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(agreement)
    }

    async fn list_agreements(
        &self,
        status: Option<AgreementStatus>,
    ) -> Result<Vec<Agreement>, DatabaseError> {
        let sql = format!(
            "SELECT {AGREEMENT_COLUMNS} FROM agreements
             WHERE ($1::text IS NULL OR status = $1)
             ORDER BY created_at DESC"
        );
        let agreements = sqlx::query_as::<_, Agreement>(&sql)
            .bind(status.map(|s| s.as_str()))
            .fetch_all(&self.pool)
            .await?;
        Ok(agreements)
    }

    async fn set_agreement_status(
        &self,
        id: Uuid,
        status: AgreementStatus,
    ) -> Result<Option<Agreement>, DatabaseError> {
        let sql = format!("UPDATE agreements SET status = $2 WHERE id = $1 RETURNING {AGREEMENT_COLUMNS}");
        let agreement = sqlx::query_as::<_, Agreement>(&sql)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(agreement)
    }

    async fn delete_agreement_by_email(&self, email: &str) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM agreements WHERE tenant_email = $1")
            .bind(email)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_agreements(&self, ids: &[Uuid]) -> Result<u64, DatabaseError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query("DELETE FROM agreements WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn ensure_agreement_email_unique(&self) -> Result<(), DatabaseError> {
        sqlx::query(
            "CREATE UNIQUE INDEX IF NOT EXISTS agreements_tenant_email_key ON agreements (tenant_email)",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl NoticeRepository for PgStore {
    async fn count_active_notices(&self, email: &str) -> Result<i64, DatabaseError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notices WHERE tenant_email = $1 AND status = $2",
        )
        .bind(email)
        .bind(NoticeStatus::Active.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn insert_notice(&self, notice: &Notice) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO notices (id, tenant_email, apartment, reason, count, status, issued_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(notice.id)
        .bind(&notice.tenant_email)
        .bind(&notice.apartment)
        .bind(&notice.reason)
        .bind(notice.count)
        .bind(notice.status.as_str())
        .bind(notice.issued_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_notices_for(&self, email: &str) -> Result<Vec<Notice>, DatabaseError> {
        let sql = format!(
            "SELECT {NOTICE_COLUMNS} FROM notices WHERE tenant_email = $1 ORDER BY issued_at DESC"
        );
        let notices = sqlx::query_as::<_, Notice>(&sql)
            .bind(email)
            .fetch_all(&self.pool)
            .await?;
        Ok(notices)
    }
}

#[async_trait]
impl CouponRepository for PgStore {
    async fn insert_coupon(&self, coupon: &Coupon) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO coupons (id, code, discount, description, available, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(coupon.id)
        .bind(&coupon.code)
        .bind(coupon.discount)
        .bind(&coupon.description)
        .bind(coupon.available)
        .bind(coupon.created_at)
        .bind(coupon.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::unique_violation(e, format!("coupon code '{}' already exists", coupon.code)))?;
        Ok(())
    }

    async fn list_coupons(&self) -> Result<Vec<Coupon>, DatabaseError> {
        let sql = format!("SELECT {COUPON_COLUMNS} FROM coupons ORDER BY created_at DESC");
        let coupons = sqlx::query_as::<_, Coupon>(&sql).fetch_all(&self.pool).await?;
        Ok(coupons)
    }

    async fn find_coupon_by_code(&self, code: &str) -> Result<Option<Coupon>, DatabaseError> {
        let sql = format!("SELECT {COUPON_COLUMNS} FROM coupons WHERE code = $1");
        let coupon = sqlx::query_as::<_, Coupon>(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        Ok(coupon)
    }

    async fn update_coupon(
        &self,
        id: Uuid,
        patch: &CouponPatch,
    ) -> Result<Option<Coupon>, DatabaseError> {
        let sql = format!(
            "UPDATE coupons SET
                discount = COALESCE($2, discount),
                description = COALESCE($3, description),
                available = COALESCE($4, available),
                updated_at = now()
             WHERE id = $1
             RETURNING {COUPON_COLUMNS}"
        );
        let coupon = sqlx::query_as::<_, Coupon>(&sql)
            .bind(id)
            .bind(patch.discount)
            .bind(patch.description.as_deref())
            .bind(patch.available)
            .fetch_optional(&self.pool)
            .await?;
        Ok(coupon)
    }

    async fn delete_coupon(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM coupons WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl AnnouncementRepository for PgStore {
    async fn insert_announcement(&self, announcement: &Announcement) -> Result<(), DatabaseError> {
        sqlx::query("INSERT INTO announcements (id, title, description, created_at) VALUES ($1, $2, $3, $4)")
            .bind(announcement.id)
            .bind(&announcement.title)
            .bind(&announcement.description)
            .bind(announcement.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_announcements(&self) -> Result<Vec<Announcement>, DatabaseError> {
        let announcements = sqlx::query_as::<_, Announcement>(
            "SELECT id, title, description, created_at FROM announcements ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(announcements)
    }
}

#[async_trait]
impl PaymentRepository for PgStore {
    async fn insert_payment(&self, payment: &Payment) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO payments (id, email, name, month, amount, discount, transaction_id, floor, block, apartment_no, coupon_code, paid_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(payment.id)
        .bind(&payment.email)
        .bind(&payment.name)
        .bind(&payment.month)
        .bind(payment.amount)
        .bind(payment.discount)
        .bind(&payment.transaction_id)
        .bind(payment.floor)
        .bind(&payment.block)
        .bind(&payment.apartment_no)
        .bind(payment.coupon_code.as_deref())
        .bind(payment.paid_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_payments(&self) -> Result<Vec<Payment>, DatabaseError> {
        let sql = format!("SELECT {PAYMENT_COLUMNS} FROM payments ORDER BY paid_at DESC");
        let payments = sqlx::query_as::<_, Payment>(&sql).fetch_all(&self.pool).await?;
        Ok(payments)
    }

    async fn list_payments_for(&self, email: &str) -> Result<Vec<Payment>, DatabaseError> {
        let sql = format!("SELECT {PAYMENT_COLUMNS} FROM payments WHERE email = $1 ORDER BY paid_at DESC");
        let payments = sqlx::query_as::<_, Payment>(&sql)
            .bind(email)
            .fetch_all(&self.pool)
            .await?;
        Ok(payments)
    }
}

#[async_trait]
impl ListingRepository for PgStore {
    async fn list_apartments(&self, query: &ApartmentQuery) -> Result<ApartmentPage, DatabaseError> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM apartments
             WHERE ($1::numeric IS NULL OR rent >= $1)
               AND ($2::numeric IS NULL OR rent <= $2)",
        )
        .bind(query.min_rent)
        .bind(query.max_rent)
        .fetch_one(&self.pool)
        .await?;

        let offset = i64::try_from(query.offset())
            .map_err(|_| DatabaseError::QueryError("page offset out of range".to_string()))?;
        let items = sqlx::query_as::<_, Apartment>(
            "SELECT id, image, floor, block, apartment_no, rent FROM apartments
             WHERE ($1::numeric IS NULL OR rent >= $1)
               AND ($2::numeric IS NULL OR rent <= $2)
             ORDER BY block, apartment_no
             LIMIT $3 OFFSET $4",
        )
        .bind(query.min_rent)
        .bind(query.max_rent)
        .bind(i64::from(query.limit))
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(ApartmentPage {
            items,
            total: u64::try_from(total).unwrap_or_default(),
            page: query.page,
            limit: query.limit,
        })
    }

    async fn insert_apartment(&self, apartment: &Apartment) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO apartments (id, image, floor, block, apartment_no, rent) VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(apartment.id)
        .bind(&apartment.image)
        .bind(apartment.floor)
        .bind(&apartment.block)
        .bind(&apartment.apartment_no)
        .bind(apartment.rent)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_buildings(&self) -> Result<Vec<Building>, DatabaseError> {
        let buildings = sqlx::query_as::<_, Building>(
            "SELECT id, name, address, floors, description, image FROM buildings ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(buildings)
    }

    async fn insert_building(&self, building: &Building) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO buildings (id, name, address, floors, description, image) VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(building.id)
        .bind(&building.name)
        .bind(&building.address)
        .bind(building.floors)
        .bind(&building.description)
        .bind(&building.image)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}
