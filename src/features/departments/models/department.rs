use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::shared::geo::GeoPoint;

/// Database model for a department
#[derive(Debug, Clone, FromRow)]
pub struct Department {
    pub id: Uuid,
    pub name: String,
    /// Category strings this department accepts
    pub categories: Vec<String>,
    /// Directory enumeration position (insertion order); routing tie-breaks
    /// depend on this ordering being stable
    pub position: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A circular service area belonging to a department.
/// An empty area list on a department means city-wide jurisdiction.
#[derive(Debug, Clone, FromRow)]
pub struct ServiceArea {
    pub id: Uuid,
    pub department_id: Uuid,
    pub center_lat: f64,
    pub center_lon: f64,
    pub radius_meters: f64,
    pub position: i64,
}

impl ServiceArea {
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(self.center_lat, self.center_lon)
    }
}

/// A department together with its ordered service areas, as the routing
/// engine consumes it
#[derive(Debug, Clone)]
pub struct DepartmentWithAreas {
    pub department: Department,
    pub areas: Vec<ServiceArea>,
}

/// Data for creating a new department
#[derive(Debug)]
pub struct CreateDepartment {
    pub name: String,
    pub categories: Vec<String>,
    pub areas: Vec<CreateServiceArea>,
}

#[derive(Debug)]
pub struct CreateServiceArea {
    pub center_lat: f64,
    pub center_lon: f64,
    pub radius_meters: f64,
}
