//! Notification HTTP handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::handlers::AuthenticatedUser;
use crate::notification::{Notification, NotificationError};
use crate::state::AppState;

impl From<NotificationError> for ApiError {
    fn from(e: NotificationError) -> Self {
        match e {
            NotificationError::NotFound => {
                ApiError::NotFound("Notification not found".to_string())
            }
            NotificationError::DatabaseError(msg) => ApiError::DatabaseError(msg),
        }
    }
}

/// GET /notifications - The caller's notifications, newest first
pub async fn list_notifications(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Notification>>, ApiError> {
    let notifications = state
        .notification_service
        .list_for_user(user.user_id)
        .await?;

    Ok(Json(notifications))
}

/// PUT /notifications/:id/read - Mark one notification read
pub async fn mark_notification_read(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Notification>, ApiError> {
    let notification = state
        .notification_service
        .mark_read(user.user_id, id)
        .await?;

    Ok(Json(notification))
}

#[derive(Debug, Serialize)]
pub struct MarkAllReadResponse {
    pub marked: u64,
}

/// PUT /notifications/read-all - Mark every notification read
pub async fn mark_all_notifications_read(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<MarkAllReadResponse>, ApiError> {
    let marked = state
        .notification_service
        .mark_all_read(user.user_id)
        .await?;

    Ok(Json(MarkAllReadResponse { marked }))
}
