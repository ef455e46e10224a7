use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::notifications::NotificationService;
use crate::features::reports::models::{
    CreateReport, Report, ReportStatus, ReportUpdate, UpdateChangeType,
};
use crate::features::reports::services::UpdateService;

const REPORT_COLUMNS: &str = r#"
    id, reporter_id, title, description, category, lat, lon, status,
    assigned_department, assigned_staff, upvote_count,
    created_at, updated_at, resolved_at
"#;

/// Service for report lifecycle operations. Routing is a separate concern
/// (see RoutingService); this service owns creation, status transitions,
/// comments and reads.
pub struct ReportService {
    pool: PgPool,
    update_service: Arc<UpdateService>,
    notification_service: Arc<NotificationService>,
}

impl ReportService {
    pub fn new(
        pool: PgPool,
        update_service: Arc<UpdateService>,
        notification_service: Arc<NotificationService>,
    ) -> Self {
        Self {
            pool,
            update_service,
            notification_service,
        }
    }

    /// Create a new report in status `new`. Creation must succeed
    /// independently of routing and notifications; callers run those
    /// afterwards, best-effort.
    pub async fn create(&self, data: &CreateReport) -> Result<Report> {
        let report = sqlx::query_as::<_, Report>(&format!(
            r#"
            INSERT INTO reports (reporter_id, title, description, category, lat, lon)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {REPORT_COLUMNS}
            "#
        ))
        .bind(&data.reporter_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.category)
        .bind(data.lat)
        .bind(data.lon)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create report: {:?}", e);
            AppError::Database(e)
        })?;

        self.update_service
            .append(
                report.id,
                Some(&data.reporter_id),
                UpdateChangeType::Created,
                None,
                Some(&ReportStatus::New.to_string()),
            )
            .await?;

        tracing::info!(
            "Created report: {} ({:?}) by {}",
            report.id,
            report.category,
            report.reporter_id
        );

        Ok(report)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Report> {
        sqlx::query_as::<_, Report>(&format!(
            "SELECT {REPORT_COLUMNS} FROM reports WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get report: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))
    }

    pub async fn list_by_reporter(&self, reporter_id: &str) -> Result<Vec<Report>> {
        sqlx::query_as::<_, Report>(&format!(
            r#"
            SELECT {REPORT_COLUMNS}
            FROM reports
            WHERE reporter_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(reporter_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list reports for reporter: {:?}", e);
            AppError::Database(e)
        })
    }

    /// Reports that are categorized but still unrouted, oldest first.
    /// Consumed by the routing sweeper.
    pub async fn list_unrouted(&self, limit: i64) -> Result<Vec<Report>> {
        sqlx::query_as::<_, Report>(&format!(
            r#"
            SELECT {REPORT_COLUMNS}
            FROM reports
            WHERE assigned_department IS NULL
              AND status = 'new'
              AND category IS NOT NULL
            ORDER BY created_at
            LIMIT $1
            "#
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list unrouted reports: {:?}", e);
            AppError::Database(e)
        })
    }

    /// Apply a status transition, enforcing the state machine.
    ///
    /// `resolved_at` is stamped exactly once, on the transition into
    /// resolved, and never overwritten. The reporter is notified
    /// best-effort after the transition is durable.
    pub async fn update_status(
        &self,
        id: Uuid,
        next: ReportStatus,
        actor_id: &str,
    ) -> Result<Report> {
        let report = self.get_by_id(id).await?;

        if !report.status.can_transition_to(next) {
            return Err(AppError::Conflict(format!(
                "Cannot transition report from {} to {}",
                report.status, next
            )));
        }

        // The WHERE clause re-checks the status the transition was validated
        // against, so a concurrent transition makes this match zero rows
        // instead of overwriting it. Terminal states stay frozen even under
        // interleaved writers.
        let updated = sqlx::query_as::<_, Report>(&format!(
            r#"
            UPDATE reports
            SET status = $2,
                resolved_at = CASE
                    WHEN $2 = 'resolved'::report_status THEN COALESCE(resolved_at, NOW())
                    ELSE resolved_at
                END,
                updated_at = NOW()
            WHERE id = $1 AND status = $3
            RETURNING {REPORT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(next)
        .bind(report.status)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update report status: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| {
            AppError::Conflict(format!(
                "Report {} was transitioned concurrently, expected status {}",
                id, report.status
            ))
        })?;

        self.update_service
            .append(
                id,
                Some(actor_id),
                UpdateChangeType::StatusChange,
                Some(&report.status.to_string()),
                Some(&next.to_string()),
            )
            .await?;

        self.notification_service
            .notify(
                &updated.reporter_id,
                "Report status updated",
                &format!(
                    "Your report \"{}\" moved from {} to {}",
                    updated.title, report.status, next
                ),
                Some(updated.id),
            )
            .await;

        tracing::info!(
            "Report {} status: {} -> {} (by {})",
            id,
            report.status,
            next,
            actor_id
        );

        Ok(updated)
    }

    /// Record a citizen upvote
    pub async fn upvote(&self, id: Uuid) -> Result<Report> {
        sqlx::query_as::<_, Report>(&format!(
            r#"
            UPDATE reports
            SET upvote_count = upvote_count + 1, updated_at = NOW()
            WHERE id = $1
            RETURNING {REPORT_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to upvote report: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))
    }

    /// Append a comment to the report's audit trail
    pub async fn add_comment(
        &self,
        id: Uuid,
        actor_id: &str,
        body: &str,
    ) -> Result<ReportUpdate> {
        // Existence check so a comment on a missing report 404s
        let _ = self.get_by_id(id).await?;

        self.update_service
            .append(id, Some(actor_id), UpdateChangeType::Comment, None, Some(body))
            .await
    }

    /// Record an escalation in the audit trail and return the report for the
    /// out-of-band notice
    pub async fn escalate(&self, id: Uuid, actor_id: &str, reason: &str) -> Result<Report> {
        let report = self.get_by_id(id).await?;

        if report.status.is_terminal() {
            return Err(AppError::Conflict(format!(
                "Cannot escalate a {} report",
                report.status
            )));
        }

        self.update_service
            .append(
                id,
                Some(actor_id),
                UpdateChangeType::Escalated,
                None,
                Some(reason),
            )
            .await?;

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::notifications::RealtimeHub;

    fn report_service(pool: PgPool) -> ReportService {
        let hub = Arc::new(RealtimeHub::new());
        ReportService::new(
            pool.clone(),
            Arc::new(UpdateService::new(pool.clone())),
            Arc::new(NotificationService::new(pool, hub)),
        )
    }

    async fn seed_citizen(pool: &PgPool) {
        sqlx::query("INSERT INTO users (id, name, role) VALUES ('citizen-1', 'Asha', 'citizen')")
            .execute(pool)
            .await
            .unwrap();
    }

    fn pothole_report() -> CreateReport {
        CreateReport {
            reporter_id: "citizen-1".to_string(),
            title: "Pothole on MG Road".to_string(),
            description: "Large pothole near the bus stop".to_string(),
            category: None,
            lat: 28.46,
            lon: 77.50,
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a live Postgres"]
    async fn test_concurrent_transitions_have_a_single_winner(pool: PgPool) {
        seed_citizen(&pool).await;
        let service = report_service(pool);

        let report = service.create(&pothole_report()).await.unwrap();
        let report = service
            .update_status(report.id, ReportStatus::Acknowledged, "staff-1")
            .await
            .unwrap();

        // Both writers validated against the same acknowledged snapshot;
        // the status guard in the UPDATE must let exactly one through
        let (resolve, progress) = tokio::join!(
            service.update_status(report.id, ReportStatus::Resolved, "staff-1"),
            service.update_status(report.id, ReportStatus::InProgress, "staff-2"),
        );

        let winners = [resolve.is_ok(), progress.is_ok()]
            .iter()
            .filter(|ok| **ok)
            .count();
        assert_eq!(winners, 1);

        let current = service.get_by_id(report.id).await.unwrap();
        if resolve.is_ok() {
            // A terminal report must never be regressed by the loser
            assert_eq!(current.status, ReportStatus::Resolved);
            assert!(current.resolved_at.is_some());
        } else {
            assert_eq!(current.status, ReportStatus::InProgress);
            assert!(current.resolved_at.is_none());
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a live Postgres"]
    async fn test_resolved_at_stamped_exactly_once(pool: PgPool) {
        seed_citizen(&pool).await;
        let service = report_service(pool);

        let report = service.create(&pothole_report()).await.unwrap();
        assert!(report.resolved_at.is_none());

        let resolved = service
            .update_status(report.id, ReportStatus::Resolved, "staff-1")
            .await
            .unwrap();
        let stamped_at = resolved.resolved_at.expect("resolved_at must be stamped");

        // Terminal: every further transition is refused and the stamp
        // never moves
        for next in [
            ReportStatus::New,
            ReportStatus::InProgress,
            ReportStatus::Resolved,
            ReportStatus::Rejected,
        ] {
            assert!(service
                .update_status(report.id, next, "staff-1")
                .await
                .is_err());
        }

        let current = service.get_by_id(report.id).await.unwrap();
        assert_eq!(current.resolved_at, Some(stamped_at));
    }
}
