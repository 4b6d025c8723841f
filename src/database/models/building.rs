use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Building {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub floors: i32,
    pub description: String,
    pub image: String,
}
