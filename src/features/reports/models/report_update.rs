use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// Audit entry change type matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "update_change_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UpdateChangeType {
    Created,
    StatusChange,
    Assigned,
    AssignedStaff,
    Comment,
    Escalated,
}

/// Append-only audit entry recording one state-changing action on a report.
/// `actor_id` is None when the system acted on its own (automated routing).
#[derive(Debug, Clone, FromRow)]
pub struct ReportUpdate {
    pub id: Uuid,
    pub report_id: Uuid,
    pub actor_id: Option<String>,
    pub change_type: UpdateChangeType,
    pub from_value: Option<String>,
    pub to_value: Option<String>,
    pub created_at: DateTime<Utc>,
}
