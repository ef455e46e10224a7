use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::notifications::models::Notification;
use crate::features::notifications::realtime::{RealtimeHub, RealtimeMessage};

/// Persists notifications and pushes them over the real-time hub.
///
/// Delivery is strictly fire-and-forget: a report's lifecycle must never
/// depend on a notification getting through, so every failure here is
/// logged and swallowed.
pub struct NotificationService {
    pool: PgPool,
    hub: Arc<RealtimeHub>,
}

impl NotificationService {
    pub fn new(pool: PgPool, hub: Arc<RealtimeHub>) -> Self {
        Self { pool, hub }
    }

    /// Persist a notification for one recipient and push it to their
    /// private channel. Best-effort; never fails the caller.
    pub async fn notify(
        &self,
        recipient_id: &str,
        title: &str,
        body: &str,
        report_id: Option<Uuid>,
    ) {
        let notification = match self
            .persist(recipient_id, title, body, report_id)
            .await
        {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(
                    "Failed to persist notification for {}: {}",
                    recipient_id,
                    e
                );
                return;
            }
        };

        let payload = serde_json::json!({
            "id": notification.id,
            "title": notification.title,
            "body": notification.body,
            "report_id": notification.report_id,
            "created_at": notification.created_at,
        });
        self.hub
            .publish_to_user(recipient_id, RealtimeMessage::new("notification", payload))
            .await;
    }

    /// Broadcast a system-wide event to every connected client (live
    /// dashboards), independent of identity. Nothing is persisted.
    pub fn broadcast(&self, event: &str, payload: serde_json::Value) {
        self.hub.broadcast(RealtimeMessage::new(event, payload));
    }

    async fn persist(
        &self,
        recipient_id: &str,
        title: &str,
        body: &str,
        report_id: Option<Uuid>,
    ) -> Result<Notification> {
        sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (recipient_id, title, body, report_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, recipient_id, title, body, is_read, report_id, created_at
            "#,
        )
        .bind(recipient_id)
        .bind(title)
        .bind(body)
        .bind(report_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to persist notification: {:?}", e);
            AppError::Database(e)
        })
    }

    /// List a user's notifications, newest first
    pub async fn list_for_user(&self, user_id: &str, limit: i64, offset: i64) -> Result<Vec<Notification>> {
        sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, recipient_id, title, body, is_read, report_id, created_at
            FROM notifications
            WHERE recipient_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list notifications: {:?}", e);
            AppError::Database(e)
        })
    }

    pub async fn unread_count(&self, user_id: &str) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count unread notifications: {:?}", e);
            AppError::Database(e)
        })
    }

    /// Mark one of the user's own notifications as read
    pub async fn mark_read(&self, user_id: &str, notification_id: Uuid) -> Result<Notification> {
        sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notifications
            SET is_read = TRUE
            WHERE id = $1 AND recipient_id = $2
            RETURNING id, recipient_id, title, body, is_read, report_id, created_at
            "#,
        )
        .bind(notification_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to mark notification read: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| {
            AppError::NotFound(format!("Notification {} not found", notification_id))
        })
    }
}
