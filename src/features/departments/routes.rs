use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::departments::handlers::{self, DepartmentState};
use crate::features::departments::services::DepartmentService;

/// Create routes for the departments feature
///
/// All routes require authentication; mutations additionally require the
/// admin role (checked in handlers)
pub fn routes(department_service: Arc<DepartmentService>) -> Router {
    let state = DepartmentState { department_service };

    Router::new()
        .route(
            "/api/departments",
            get(handlers::list_departments).post(handlers::create_department),
        )
        .route(
            "/api/departments/{id}",
            get(handlers::get_department).put(handlers::update_department),
        )
        .with_state(state)
}
