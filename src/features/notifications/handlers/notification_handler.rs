use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, Query, State,
    },
    response::Response,
    Json,
};
use futures::{SinkExt, StreamExt};

use crate::core::error::Result;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::notifications::dtos::{NotificationResponseDto, UnreadCountDto};
use crate::features::notifications::realtime::RealtimeHub;
use crate::features::notifications::services::NotificationService;
use crate::shared::types::{ApiResponse, PaginationQuery};

/// State for notification handlers
#[derive(Clone)]
pub struct NotificationState {
    pub notification_service: Arc<NotificationService>,
    pub hub: Arc<RealtimeHub>,
}

/// List the authenticated user's notifications, newest first
#[utoipa::path(
    get,
    path = "/api/notifications",
    params(PaginationQuery),
    responses(
        (status = 200, description = "List of notifications", body = ApiResponse<Vec<NotificationResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "notifications"
)]
pub async fn list_notifications(
    user: AuthenticatedUser,
    State(state): State<NotificationState>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<NotificationResponseDto>>>> {
    let notifications = state
        .notification_service
        .list_for_user(&user.sub, pagination.limit(), pagination.offset())
        .await?;
    let dtos: Vec<NotificationResponseDto> =
        notifications.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, None)))
}

/// Get the authenticated user's unread notification count
#[utoipa::path(
    get,
    path = "/api/notifications/unread-count",
    responses(
        (status = 200, description = "Unread count", body = ApiResponse<UnreadCountDto>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "notifications"
)]
pub async fn unread_count(
    user: AuthenticatedUser,
    State(state): State<NotificationState>,
) -> Result<Json<ApiResponse<UnreadCountDto>>> {
    let unread = state.notification_service.unread_count(&user.sub).await?;
    Ok(Json(ApiResponse::success(
        Some(UnreadCountDto { unread }),
        None,
        None,
    )))
}

/// Mark a notification as read
#[utoipa::path(
    post,
    path = "/api/notifications/{id}/read",
    params(
        ("id" = Uuid, Path, description = "Notification ID")
    ),
    responses(
        (status = 200, description = "Notification marked read", body = ApiResponse<NotificationResponseDto>),
        (status = 404, description = "Notification not found")
    ),
    security(("bearer_auth" = [])),
    tag = "notifications"
)]
pub async fn mark_read(
    user: AuthenticatedUser,
    State(state): State<NotificationState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<Json<ApiResponse<NotificationResponseDto>>> {
    let notification = state.notification_service.mark_read(&user.sub, id).await?;
    Ok(Json(ApiResponse::success(
        Some(notification.into()),
        None,
        None,
    )))
}

/// WebSocket stream of the user's private notifications plus global
/// dashboard broadcasts. Missed messages are not replayed; clients fetch
/// persisted notifications on reconnect.
pub async fn notification_stream(
    user: AuthenticatedUser,
    State(state): State<NotificationState>,
    ws: WebSocketUpgrade,
) -> Response {
    let hub = Arc::clone(&state.hub);
    ws.on_upgrade(move |socket| handle_socket(socket, hub, user.sub))
}

async fn handle_socket(socket: WebSocket, hub: Arc<RealtimeHub>, user_id: String) {
    let mut user_rx = hub.subscribe_user(&user_id).await;
    let mut broadcast_rx = hub.subscribe_all();
    let (mut sender, mut receiver) = socket.split();

    tracing::debug!("Realtime connection opened for user {}", user_id);

    loop {
        let message = tokio::select! {
            msg = user_rx.recv() => msg,
            msg = broadcast_rx.recv() => msg,
            incoming = receiver.next() => {
                match incoming {
                    // Client pings and stray frames are ignored
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    _ => continue,
                }
            }
        };

        let message = match message {
            Ok(m) => m,
            // Lagged receivers skip ahead; closed channels end the session
            Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!(
                    "Realtime stream for {} lagged, skipped {} messages",
                    user_id,
                    skipped
                );
                continue;
            }
            Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
        };

        let text = match serde_json::to_string(&message) {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!("Failed to serialize realtime message: {}", e);
                continue;
            }
        };

        if sender.send(Message::Text(text.into())).await.is_err() {
            break;
        }
    }

    tracing::debug!("Realtime connection closed for user {}", user_id);
}
