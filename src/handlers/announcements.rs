use axum::extract::State;
use serde::Deserialize;

use super::validation::FieldErrors;
use crate::database::models::Announcement;
use crate::database::AnnouncementRepository;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnnouncementRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// POST /announcements (admin)
pub async fn create(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<AnnouncementRequest>,
) -> ApiResult<Announcement> {
    let mut fields = FieldErrors::new();
    let title = fields.require_text("title", body.title);
    let description = fields.require_text("description", body.description);
    let (Some(title), Some(description)) = (title, description) else {
        return Err(fields.into_error());
    };

    let announcement = Announcement::new(title, description);
    state.store.insert_announcement(&announcement).await?;

    Ok(ApiResponse::created(announcement))
}

/// GET /announcements - Newest first
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Announcement>> {
    Ok(ApiResponse::success(state.store.list_announcements().await?))
}
