use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::reports::models::{
    Report, ReportCategory, ReportStatus, ReportUpdate, UpdateChangeType,
};

/// Request DTO for submitting a report. Title and category may be omitted;
/// the analysis collaborator fills them in where it can.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReportDto {
    #[validate(length(min = 3, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 5000))]
    #[serde(default)]
    pub description: String,
    pub category: Option<ReportCategory>,
    /// Latitude; required and immutable after creation
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,
    /// Longitude; required and immutable after creation
    #[validate(range(min = -180.0, max = 180.0))]
    pub lon: f64,
}

/// Request DTO for a status transition
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateReportStatusDto {
    pub status: ReportStatus,
}

/// Request DTO for a comment on a report
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CommentDto {
    #[validate(length(min = 1, max = 2000))]
    pub body: String,
}

/// Request DTO for escalating a report
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct EscalateDto {
    #[validate(length(min = 1, max = 2000))]
    pub reason: String,
}

/// Response DTO for a report
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportResponseDto {
    pub id: Uuid,
    pub reporter_id: String,
    pub title: String,
    pub description: String,
    pub category: Option<ReportCategory>,
    pub lat: f64,
    pub lon: f64,
    pub status: ReportStatus,
    pub assigned_department: Option<Uuid>,
    pub assigned_staff: Option<String>,
    pub upvote_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl From<Report> for ReportResponseDto {
    fn from(r: Report) -> Self {
        Self {
            id: r.id,
            reporter_id: r.reporter_id,
            title: r.title,
            description: r.description,
            category: r.category,
            lat: r.lat,
            lon: r.lon,
            status: r.status,
            assigned_department: r.assigned_department,
            assigned_staff: r.assigned_staff,
            upvote_count: r.upvote_count,
            created_at: r.created_at,
            updated_at: r.updated_at,
            resolved_at: r.resolved_at,
        }
    }
}

/// Response DTO for an audit trail entry
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReportUpdateResponseDto {
    pub id: Uuid,
    pub actor_id: Option<String>,
    pub change_type: UpdateChangeType,
    pub from_value: Option<String>,
    pub to_value: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ReportUpdate> for ReportUpdateResponseDto {
    fn from(u: ReportUpdate) -> Self {
        Self {
            id: u.id,
            actor_id: u.actor_id,
            change_type: u.change_type,
            from_value: u.from_value,
            to_value: u.to_value,
            created_at: u.created_at,
        }
    }
}
