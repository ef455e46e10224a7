use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::departments::dtos::{CreateDepartmentDto, DepartmentResponseDto};
use crate::features::departments::services::DepartmentService;
use crate::shared::types::ApiResponse;

/// State for department handlers
#[derive(Clone)]
pub struct DepartmentState {
    pub department_service: Arc<DepartmentService>,
}

fn require_admin(user: &AuthenticatedUser) -> Result<()> {
    if !user.is_admin() {
        return Err(AppError::Forbidden(
            "Only administrators may manage departments".to_string(),
        ));
    }
    Ok(())
}

/// Create a department (admin only)
#[utoipa::path(
    post,
    path = "/api/departments",
    request_body = CreateDepartmentDto,
    responses(
        (status = 200, description = "Department created", body = ApiResponse<DepartmentResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "departments"
)]
pub async fn create_department(
    user: AuthenticatedUser,
    State(state): State<DepartmentState>,
    AppJson(dto): AppJson<CreateDepartmentDto>,
) -> Result<Json<ApiResponse<DepartmentResponseDto>>> {
    require_admin(&user)?;
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let created = state.department_service.create(&dto.into()).await?;
    Ok(Json(ApiResponse::success(Some(created.into()), None, None)))
}

/// Replace a department's name, categories and service areas (admin only)
#[utoipa::path(
    put,
    path = "/api/departments/{id}",
    params(
        ("id" = Uuid, Path, description = "Department ID")
    ),
    request_body = CreateDepartmentDto,
    responses(
        (status = 200, description = "Department updated", body = ApiResponse<DepartmentResponseDto>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Department not found")
    ),
    security(("bearer_auth" = [])),
    tag = "departments"
)]
pub async fn update_department(
    user: AuthenticatedUser,
    State(state): State<DepartmentState>,
    Path(id): Path<uuid::Uuid>,
    AppJson(dto): AppJson<CreateDepartmentDto>,
) -> Result<Json<ApiResponse<DepartmentResponseDto>>> {
    require_admin(&user)?;
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let updated = state.department_service.update(id, &dto.into()).await?;
    Ok(Json(ApiResponse::success(Some(updated.into()), None, None)))
}

/// List departments in directory order
#[utoipa::path(
    get,
    path = "/api/departments",
    responses(
        (status = 200, description = "List of departments", body = ApiResponse<Vec<DepartmentResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "departments"
)]
pub async fn list_departments(
    _user: AuthenticatedUser,
    State(state): State<DepartmentState>,
) -> Result<Json<ApiResponse<Vec<DepartmentResponseDto>>>> {
    let departments = state.department_service.list().await?;
    let dtos: Vec<DepartmentResponseDto> = departments.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, None)))
}

/// Get department by ID
#[utoipa::path(
    get,
    path = "/api/departments/{id}",
    params(
        ("id" = Uuid, Path, description = "Department ID")
    ),
    responses(
        (status = 200, description = "Department found", body = ApiResponse<DepartmentResponseDto>),
        (status = 404, description = "Department not found")
    ),
    security(("bearer_auth" = [])),
    tag = "departments"
)]
pub async fn get_department(
    _user: AuthenticatedUser,
    State(state): State<DepartmentState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<Json<ApiResponse<DepartmentResponseDto>>> {
    let department = state.department_service.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(
        Some(department.into()),
        None,
        None,
    )))
}
