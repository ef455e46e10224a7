use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::notifications::handlers::{self, NotificationState};
use crate::features::notifications::realtime::RealtimeHub;
use crate::features::notifications::services::NotificationService;

/// Create routes for the notifications feature (all require auth)
pub fn routes(
    notification_service: Arc<NotificationService>,
    hub: Arc<RealtimeHub>,
) -> Router {
    let state = NotificationState {
        notification_service,
        hub,
    };

    Router::new()
        .route("/api/notifications", get(handlers::list_notifications))
        .route(
            "/api/notifications/unread-count",
            get(handlers::unread_count),
        )
        .route("/api/notifications/{id}/read", post(handlers::mark_read))
        .route("/api/notifications/ws", get(handlers::notification_stream))
        .with_state(state)
}
