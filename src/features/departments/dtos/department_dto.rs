use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::departments::models::{
    CreateDepartment, CreateServiceArea, DepartmentWithAreas, ServiceArea,
};

/// Request DTO for creating or replacing a department
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateDepartmentDto {
    #[validate(length(min = 2, max = 120))]
    pub name: String,
    /// Category strings this department accepts, e.g. "pothole"
    #[validate(length(min = 1))]
    pub categories: Vec<String>,
    /// Circular service areas in priority order; empty means city-wide
    #[serde(default)]
    #[validate(nested)]
    pub service_areas: Vec<ServiceAreaDto>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ServiceAreaDto {
    #[validate(range(min = -90.0, max = 90.0))]
    pub center_lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub center_lon: f64,
    #[validate(range(min = 0.0))]
    pub radius_meters: f64,
}

impl From<CreateDepartmentDto> for CreateDepartment {
    fn from(dto: CreateDepartmentDto) -> Self {
        Self {
            name: dto.name,
            categories: dto.categories,
            areas: dto
                .service_areas
                .into_iter()
                .map(|a| CreateServiceArea {
                    center_lat: a.center_lat,
                    center_lon: a.center_lon,
                    radius_meters: a.radius_meters,
                })
                .collect(),
        }
    }
}

/// Response DTO for a department with its service areas
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DepartmentResponseDto {
    pub id: Uuid,
    pub name: String,
    pub categories: Vec<String>,
    pub service_areas: Vec<ServiceAreaResponseDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ServiceAreaResponseDto {
    pub id: Uuid,
    pub center_lat: f64,
    pub center_lon: f64,
    pub radius_meters: f64,
}

impl From<ServiceArea> for ServiceAreaResponseDto {
    fn from(a: ServiceArea) -> Self {
        Self {
            id: a.id,
            center_lat: a.center_lat,
            center_lon: a.center_lon,
            radius_meters: a.radius_meters,
        }
    }
}

impl From<DepartmentWithAreas> for DepartmentResponseDto {
    fn from(d: DepartmentWithAreas) -> Self {
        Self {
            id: d.department.id,
            name: d.department.name,
            categories: d.department.categories,
            service_areas: d.areas.into_iter().map(Into::into).collect(),
            created_at: d.department.created_at,
            updated_at: d.department.updated_at,
        }
    }
}
