use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// User role enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Citizen,
    Staff,
    Admin,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Citizen => write!(f, "citizen"),
            UserRole::Staff => write!(f, "staff"),
            UserRole::Admin => write!(f, "admin"),
        }
    }
}

/// Database model for a user. The primary key is the auth subject issued by
/// the identity provider, so reports and notifications reference users by
/// that subject directly.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: String,
    pub name: String,
    pub role: UserRole,
    pub department_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
