use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::notifications::models::Notification;

/// Response DTO for a notification
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NotificationResponseDto {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub is_read: bool,
    pub report_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationResponseDto {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id,
            title: n.title,
            body: n.body,
            is_read: n.is_read,
            report_id: n.report_id,
            created_at: n.created_at,
        }
    }
}

/// Response DTO for the unread badge count
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UnreadCountDto {
    pub unread: i64,
}
