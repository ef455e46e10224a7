use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::shared::geo::GeoPoint;

/// Report category enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "report_category", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReportCategory {
    Pothole,
    Streetlight,
    Garbage,
    Water,
    Tree,
    Other,
}

impl std::fmt::Display for ReportCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportCategory::Pothole => write!(f, "pothole"),
            ReportCategory::Streetlight => write!(f, "streetlight"),
            ReportCategory::Garbage => write!(f, "garbage"),
            ReportCategory::Water => write!(f, "water"),
            ReportCategory::Tree => write!(f, "tree"),
            ReportCategory::Other => write!(f, "other"),
        }
    }
}

/// Report status enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "report_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    New,
    Acknowledged,
    InProgress,
    Resolved,
    Rejected,
}

impl ReportStatus {
    /// Resolved and rejected are terminal; no further transitions
    pub fn is_terminal(self) -> bool {
        matches!(self, ReportStatus::Resolved | ReportStatus::Rejected)
    }

    fn rank(self) -> u8 {
        match self {
            ReportStatus::New => 0,
            ReportStatus::Acknowledged => 1,
            ReportStatus::InProgress => 2,
            ReportStatus::Resolved => 3,
            ReportStatus::Rejected => 3,
        }
    }

    /// Status only moves forward (skipping intermediate states is allowed),
    /// except that rejected is reachable from any non-terminal state.
    pub fn can_transition_to(self, next: ReportStatus) -> bool {
        if self.is_terminal() || next == self {
            return false;
        }
        match next {
            ReportStatus::Rejected => true,
            _ => next.rank() > self.rank(),
        }
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportStatus::New => write!(f, "new"),
            ReportStatus::Acknowledged => write!(f, "acknowledged"),
            ReportStatus::InProgress => write!(f, "in_progress"),
            ReportStatus::Resolved => write!(f, "resolved"),
            ReportStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Database model for a citizen report
#[derive(Debug, Clone, FromRow)]
pub struct Report {
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

impl Report {
    /// The report's location; immutable after creation
    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }
}

/// Data for creating a new report
#[derive(Debug)]
pub struct CreateReport {
    pub reporter_id: String,
    pub title: String,
    pub description: String,
    pub category: Option<ReportCategory>,
    pub lat: f64,
    pub lon: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions_allowed() {
        assert!(ReportStatus::New.can_transition_to(ReportStatus::Acknowledged));
        assert!(ReportStatus::Acknowledged.can_transition_to(ReportStatus::InProgress));
        assert!(ReportStatus::InProgress.can_transition_to(ReportStatus::Resolved));
        // Skipping forward is permitted
        assert!(ReportStatus::New.can_transition_to(ReportStatus::Resolved));
    }

    #[test]
    fn test_backward_transitions_rejected() {
        assert!(!ReportStatus::InProgress.can_transition_to(ReportStatus::Acknowledged));
        assert!(!ReportStatus::Acknowledged.can_transition_to(ReportStatus::New));
    }

    #[test]
    fn test_rejected_reachable_from_any_non_terminal() {
        assert!(ReportStatus::New.can_transition_to(ReportStatus::Rejected));
        assert!(ReportStatus::Acknowledged.can_transition_to(ReportStatus::Rejected));
        assert!(ReportStatus::InProgress.can_transition_to(ReportStatus::Rejected));
    }

    #[test]
    fn test_terminal_states_frozen() {
        for next in [
            ReportStatus::New,
            ReportStatus::Acknowledged,
            ReportStatus::InProgress,
            ReportStatus::Resolved,
            ReportStatus::Rejected,
        ] {
            assert!(!ReportStatus::Resolved.can_transition_to(next));
            assert!(!ReportStatus::Rejected.can_transition_to(next));
        }
    }

    #[test]
    fn test_self_transition_rejected() {
        assert!(!ReportStatus::InProgress.can_transition_to(ReportStatus::InProgress));
    }
}
