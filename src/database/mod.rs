pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::AppConfig;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use repository::{
    AgreementRepository, AnnouncementRepository, CouponRepository, ListingRepository,
    NoticeRepository, PaymentRepository, Store, UserRepository,
};

/// Open the configured store: PostgreSQL when a URL is set, otherwise the
/// in-memory store (refused in production by `AppConfig::validate`).
pub async fn open_store(config: &AppConfig) -> Result<Arc<dyn Store>, DatabaseError> {
    if config.database.url.is_none() {
        warn!("DATABASE_URL not set; using in-memory store, data will not survive restarts");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let pool = DatabaseManager::connect(&config.database).await?;
    let store = PgStore::new(pool);
    store.ensure_schema().await?;
    info!("Using {} store", store.backend());
    Ok(Arc::new(store))
}
