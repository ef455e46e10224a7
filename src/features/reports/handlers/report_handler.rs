use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::analysis::AnalysisClient;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::notifications::{EscalationService, NotificationService};
use crate::features::reports::dtos::{
    CommentDto, CreateReportDto, EscalateDto, ReportResponseDto, ReportUpdateResponseDto,
    UpdateReportStatusDto,
};
use crate::features::reports::models::CreateReport;
use crate::features::reports::services::{ReportService, RoutingService, UpdateService};
use crate::features::users::UserService;
use crate::shared::types::ApiResponse;

/// State for report handlers
#[derive(Clone)]
pub struct ReportState {
    pub report_service: Arc<ReportService>,
    pub routing_service: Arc<RoutingService>,
    pub update_service: Arc<UpdateService>,
    pub notification_service: Arc<NotificationService>,
    pub user_service: Arc<UserService>,
    pub escalation_service: Arc<EscalationService>,
    pub analysis_client: Arc<AnalysisClient>,
}

/// Submit a new report.
///
/// Creation always succeeds independently of what follows: the dashboard
/// broadcast, admin notifications and auto-routing are all best-effort.
#[utoipa::path(
    post,
    path = "/api/reports",
    request_body = CreateReportDto,
    responses(
        (status = 200, description = "Report created", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn create_report(
    user: AuthenticatedUser,
    State(state): State<ReportState>,
    AppJson(dto): AppJson<CreateReportDto>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    // Let the analysis collaborator fill in what the citizen left out;
    // it never blocks creation
    let mut title = dto.title;
    let mut category = dto.category;
    if (title.is_none() || category.is_none()) && !dto.description.is_empty() {
        let analysis = state.analysis_client.analyze_text(&dto.description).await;
        title = title.or(analysis.title);
        category = category.or(analysis.category);
    }

    let data = CreateReport {
        reporter_id: user.sub.clone(),
        title: title.unwrap_or_else(|| "Citizen report".to_string()),
        description: dto.description,
        category,
        lat: dto.lat,
        lon: dto.lon,
    };

    let report = state.report_service.create(&data).await?;

    state.notification_service.broadcast(
        "report.created",
        serde_json::json!({
            "id": report.id,
            "title": report.title,
            "category": report.category,
            "lat": report.lat,
            "lon": report.lon,
        }),
    );

    // Best-effort heads-up for administrators; failures are swallowed inside
    match state.user_service.list_admins().await {
        Ok(admins) => {
            for admin in admins {
                state
                    .notification_service
                    .notify(
                        &admin.id,
                        "New report submitted",
                        &format!("\"{}\" was just reported", report.title),
                        Some(report.id),
                    )
                    .await;
            }
        }
        Err(e) => tracing::warn!("Skipping admin notifications: {}", e),
    }

    // Auto-routing is best-effort; the unrouted report is returned as-is
    // when no department matches or anything fails
    let report = state.routing_service.route_report(report, None).await;

    Ok(Json(ApiResponse::success(Some(report.into()), None, None)))
}

/// List reports submitted by the authenticated user
#[utoipa::path(
    get,
    path = "/api/reports",
    responses(
        (status = 200, description = "List of own reports", body = ApiResponse<Vec<ReportResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn list_reports(
    user: AuthenticatedUser,
    State(state): State<ReportState>,
) -> Result<Json<ApiResponse<Vec<ReportResponseDto>>>> {
    let reports = state.report_service.list_by_reporter(&user.sub).await?;
    let dtos: Vec<ReportResponseDto> = reports.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, None)))
}

/// Get report by ID
#[utoipa::path(
    get,
    path = "/api/reports/{id}",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Report found", body = ApiResponse<ReportResponseDto>),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn get_report(
    _user: AuthenticatedUser,
    State(state): State<ReportState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let report = state.report_service.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(Some(report.into()), None, None)))
}

/// Audit trail for a report, oldest first
#[utoipa::path(
    get,
    path = "/api/reports/{id}/updates",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Audit trail", body = ApiResponse<Vec<ReportUpdateResponseDto>>),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn list_report_updates(
    _user: AuthenticatedUser,
    State(state): State<ReportState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<Json<ApiResponse<Vec<ReportUpdateResponseDto>>>> {
    // 404 for unknown reports rather than an empty trail
    let _ = state.report_service.get_by_id(id).await?;
    let updates = state.update_service.list_for_report(id).await?;
    let dtos: Vec<ReportUpdateResponseDto> = updates.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, None)))
}

/// Update report status (staff or admin)
#[utoipa::path(
    patch,
    path = "/api/reports/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    request_body = UpdateReportStatusDto,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<ReportResponseDto>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Report not found"),
        (status = 409, description = "Transition not allowed")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn update_report_status(
    user: AuthenticatedUser,
    State(state): State<ReportState>,
    Path(id): Path<uuid::Uuid>,
    AppJson(dto): AppJson<UpdateReportStatusDto>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    if !user.can_update_status() {
        return Err(AppError::Forbidden(
            "Only staff or administrators may change report status".to_string(),
        ));
    }

    let report = state
        .report_service
        .update_status(id, dto.status, &user.sub)
        .await?;
    Ok(Json(ApiResponse::success(Some(report.into()), None, None)))
}

/// Re-run routing for a report (admin override / re-triage)
#[utoipa::path(
    post,
    path = "/api/reports/{id}/route",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Routing attempted", body = ApiResponse<ReportResponseDto>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn reroute_report(
    user: AuthenticatedUser,
    State(state): State<ReportState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    if !user.is_admin() {
        return Err(AppError::Forbidden(
            "Only administrators may re-route reports".to_string(),
        ));
    }

    let report = state.report_service.get_by_id(id).await?;
    let report = state
        .routing_service
        .route_report(report, Some(&user.sub))
        .await;
    Ok(Json(ApiResponse::success(Some(report.into()), None, None)))
}

/// Upvote a report
#[utoipa::path(
    post,
    path = "/api/reports/{id}/upvote",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Upvote recorded", body = ApiResponse<ReportResponseDto>),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn upvote_report(
    _user: AuthenticatedUser,
    State(state): State<ReportState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let report = state.report_service.upvote(id).await?;
    Ok(Json(ApiResponse::success(Some(report.into()), None, None)))
}

/// Comment on a report (recorded in the audit trail)
#[utoipa::path(
    post,
    path = "/api/reports/{id}/comments",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    request_body = CommentDto,
    responses(
        (status = 200, description = "Comment recorded", body = ApiResponse<ReportUpdateResponseDto>),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn comment_on_report(
    user: AuthenticatedUser,
    State(state): State<ReportState>,
    Path(id): Path<uuid::Uuid>,
    AppJson(dto): AppJson<CommentDto>,
) -> Result<Json<ApiResponse<ReportUpdateResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let entry = state
        .report_service
        .add_comment(id, &user.sub, &dto.body)
        .await?;
    Ok(Json(ApiResponse::success(Some(entry.into()), None, None)))
}

/// Escalate a report (admin only): audit entry plus out-of-band notice
#[utoipa::path(
    post,
    path = "/api/reports/{id}/escalate",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    request_body = EscalateDto,
    responses(
        (status = 200, description = "Report escalated", body = ApiResponse<ReportResponseDto>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Report not found"),
        (status = 409, description = "Report already terminal")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn escalate_report(
    user: AuthenticatedUser,
    State(state): State<ReportState>,
    Path(id): Path<uuid::Uuid>,
    AppJson(dto): AppJson<EscalateDto>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    if !user.is_admin() {
        return Err(AppError::Forbidden(
            "Only administrators may escalate reports".to_string(),
        ));
    }
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let report = state
        .report_service
        .escalate(id, &user.sub, &dto.reason)
        .await?;

    // Out-of-band notice; failures are logged inside and never surface
    state
        .escalation_service
        .send_escalation(&report, &user.sub, &dto.reason)
        .await;

    Ok(Json(ApiResponse::success(Some(report.into()), None, None)))
}
