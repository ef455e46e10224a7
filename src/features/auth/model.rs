use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::constants::{ROLE_ADMIN, ROLE_STAFF};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub sub: String,
    pub roles: Vec<String>,
}

impl AuthenticatedUser {
    /// Check if user has a specific role
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Check if user is an administrator (department CRUD, routing overrides)
    pub fn is_admin(&self) -> bool {
        self.has_role(ROLE_ADMIN)
    }

    /// Check if user is department staff
    #[allow(dead_code)]
    pub fn is_staff(&self) -> bool {
        self.has_role(ROLE_STAFF)
    }

    /// Staff and admins may change report status
    pub fn can_update_status(&self) -> bool {
        self.is_admin() || self.has_role(ROLE_STAFF)
    }
}

/// JWT claims carried by bearer tokens issued by the identity provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub roles: Vec<String>,
    pub exp: u64,
}
