use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::departments::{dtos as departments_dtos, handlers as departments_handlers};
use crate::features::notifications::{
    dtos as notifications_dtos, handlers as notifications_handlers,
};
use crate::features::reports::{
    dtos as reports_dtos, handlers as reports_handlers, models as reports_models,
};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Departments
        departments_handlers::create_department,
        departments_handlers::update_department,
        departments_handlers::list_departments,
        departments_handlers::get_department,
        // Reports
        reports_handlers::create_report,
        reports_handlers::list_reports,
        reports_handlers::get_report,
        reports_handlers::list_report_updates,
        reports_handlers::update_report_status,
        reports_handlers::reroute_report,
        reports_handlers::upvote_report,
        reports_handlers::comment_on_report,
        reports_handlers::escalate_report,
        // Notifications
        notifications_handlers::list_notifications,
        notifications_handlers::unread_count,
        notifications_handlers::mark_read,
    ),
    components(schemas(
        Meta,
        departments_dtos::CreateDepartmentDto,
        departments_dtos::ServiceAreaDto,
        departments_dtos::DepartmentResponseDto,
        departments_dtos::ServiceAreaResponseDto,
        reports_dtos::CreateReportDto,
        reports_dtos::UpdateReportStatusDto,
        reports_dtos::CommentDto,
        reports_dtos::EscalateDto,
        reports_dtos::ReportResponseDto,
        reports_dtos::ReportUpdateResponseDto,
        reports_models::ReportCategory,
        reports_models::ReportStatus,
        reports_models::UpdateChangeType,
        notifications_dtos::NotificationResponseDto,
        notifications_dtos::UnreadCountDto,
    )),
    tags(
        (name = "departments", description = "Department directory (admin-managed)"),
        (name = "reports", description = "Citizen reports, routing and audit trail"),
        (name = "notifications", description = "Per-user notifications and real-time stream"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Nagarsetu API",
        version = "0.1.0",
        description = "API documentation for Nagarsetu",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
