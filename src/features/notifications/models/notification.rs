use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for a persisted notification
#[derive(Debug, Clone, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub recipient_id: String,
    pub title: String,
    pub body: String,
    pub is_read: bool,
    pub report_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
