use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::reports::models::{ReportUpdate, UpdateChangeType};

/// Append-only audit trail of report state transitions. Entries are never
/// edited or deleted.
pub struct UpdateService {
    pool: PgPool,
}

impl UpdateService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn append(
        &self,
        report_id: Uuid,
        actor_id: Option<&str>,
        change_type: UpdateChangeType,
        from_value: Option<&str>,
        to_value: Option<&str>,
    ) -> Result<ReportUpdate> {
        let entry = sqlx::query_as::<_, ReportUpdate>(
            r#"
            INSERT INTO report_updates (report_id, actor_id, change_type, from_value, to_value)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, report_id, actor_id, change_type, from_value, to_value, created_at
            "#,
        )
        .bind(report_id)
        .bind(actor_id)
        .bind(change_type)
        .bind(from_value)
        .bind(to_value)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to append report update: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::debug!(
            "Audit entry {:?} appended for report {}",
            change_type,
            report_id
        );

        Ok(entry)
    }

    /// Audit history for one report, oldest first
    pub async fn list_for_report(&self, report_id: Uuid) -> Result<Vec<ReportUpdate>> {
        sqlx::query_as::<_, ReportUpdate>(
            r#"
            SELECT id, report_id, actor_id, change_type, from_value, to_value, created_at
            FROM report_updates
            WHERE report_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(report_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list report updates: {:?}", e);
            AppError::Database(e)
        })
    }
}
