use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::features::analysis::AnalysisClient;
use crate::features::notifications::{EscalationService, NotificationService};
use crate::features::reports::handlers::{self, ReportState};
use crate::features::reports::services::{ReportService, RoutingService, UpdateService};
use crate::features::users::UserService;

/// Create routes for the reports feature (all require auth)
#[allow(clippy::too_many_arguments)]
pub fn routes(
    report_service: Arc<ReportService>,
    routing_service: Arc<RoutingService>,
    update_service: Arc<UpdateService>,
    notification_service: Arc<NotificationService>,
    user_service: Arc<UserService>,
    escalation_service: Arc<EscalationService>,
    analysis_client: Arc<AnalysisClient>,
) -> Router {
    let state = ReportState {
        report_service,
        routing_service,
        update_service,
        notification_service,
        user_service,
        escalation_service,
        analysis_client,
    };

    Router::new()
        .route(
            "/api/reports",
            get(handlers::list_reports).post(handlers::create_report),
        )
        .route("/api/reports/{id}", get(handlers::get_report))
        .route(
            "/api/reports/{id}/updates",
            get(handlers::list_report_updates),
        )
        .route(
            "/api/reports/{id}/status",
            patch(handlers::update_report_status),
        )
        .route("/api/reports/{id}/route", post(handlers::reroute_report))
        .route("/api/reports/{id}/upvote", post(handlers::upvote_report))
        .route(
            "/api/reports/{id}/comments",
            post(handlers::comment_on_report),
        )
        .route(
            "/api/reports/{id}/escalate",
            post(handlers::escalate_report),
        )
        .with_state(state)
}
