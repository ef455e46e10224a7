use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::users::models::User;

/// Service for user lookups needed by routing and notification fan-out
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Staff members of a department, in stable enumeration order.
    /// The load balancer's tie-break depends on this ordering.
    pub async fn list_staff_by_department(&self, department_id: Uuid) -> Result<Vec<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, role, department_id, created_at
            FROM users
            WHERE role = 'staff' AND department_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(department_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list staff for department: {:?}", e);
            AppError::Database(e)
        })
    }

    /// A staff member's current load: assigned reports not yet resolved
    pub async fn open_report_count(&self, staff_id: &str) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM reports
            WHERE assigned_staff = $1 AND status <> 'resolved'
            "#,
        )
        .bind(staff_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count open reports for staff: {:?}", e);
            AppError::Database(e)
        })
    }

    /// All administrators, for best-effort new-report notifications
    pub async fn list_admins(&self) -> Result<Vec<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, role, department_id, created_at
            FROM users
            WHERE role = 'admin'
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list admins: {:?}", e);
            AppError::Database(e)
        })
    }
}
