//! User profile HTTP handlers

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::handlers::{AdminUser, AuthenticatedUser};
use crate::models::UserResponse;
use crate::state::AppState;

/// GET /users/me - The caller's own profile
pub async fn get_me(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<UserResponse>, ApiError> {
    let account = state.auth_service.get_user_by_id(user.user_id).await?;
    Ok(Json(account.into()))
}

/// GET /users/:id - A user's public profile (admin sees everything,
/// everyone else a sanitized view)
pub async fn get_user(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, ApiError> {
    let account = state.auth_service.get_user_by_id(id).await?;
    Ok(Json(account.into()))
}

/// GET /users - All users (admin dashboard)
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = sqlx::query_as::<_, crate::models::User>(
        "SELECT * FROM users ORDER BY created_at DESC",
    )
    .fetch_all(state.auth_service.db_pool())
    .await
    .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    Ok(Json(users.into_iter().map(Into::into).collect()))
}
