//! Authentication HTTP handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use validator::Validate;

use crate::auth::{AuthError, VerificationError};
use crate::error::ApiError;
use crate::handlers::AuthenticatedUser;
use crate::models::{
    AuthTokensResponse, ForgotPasswordRequest, LoginRequest, RefreshTokenRequest, RegisterRequest,
    ResetPasswordRequest, UserResponse, VerificationKind, VerifyEmailRequest,
};
use crate::state::AppState;

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::EmailTaken => ApiError::Conflict("Email already registered".to_string()),
            AuthError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid email or password".to_string())
            }
            AuthError::UserNotFound => ApiError::NotFound("User not found".to_string()),
            AuthError::SessionNotFound | AuthError::InvalidRefreshToken => {
                ApiError::Unauthorized("Session invalid or expired".to_string())
            }
            AuthError::TokenError(msg) => ApiError::Unauthorized(msg),
            AuthError::DatabaseError(msg) => ApiError::DatabaseError(msg),
            AuthError::HashError(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<VerificationError> for ApiError {
    fn from(e: VerificationError) -> Self {
        match e {
            VerificationError::InvalidToken => {
                ApiError::BadRequest("Token invalid, expired, or already used".to_string())
            }
            VerificationError::DatabaseError(msg) => ApiError::DatabaseError(msg),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: UserResponse,
    /// Raw verification token; handed to the e-mail delivery pipeline.
    /// Exposed in the response only until that pipeline exists.
    pub verification_token: String,
}

/// POST /auth/register - Create an account and issue a verification token
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    request.validate()?;

    let user = state.auth_service.register(request).await?;

    let (raw_token, _) = state
        .verification_service
        .issue(user.id, VerificationKind::EmailVerification)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user: user.into(),
            verification_token: raw_token,
        }),
    ))
}

/// POST /auth/login - Authenticate and issue a token pair
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthTokensResponse>, ApiError> {
    let tokens = state
        .auth_service
        .login(&request.email, &request.password)
        .await?;

    Ok(Json(tokens))
}

/// POST /auth/refresh - Rotate a refresh token
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshTokenRequest>,
) -> Result<Json<AuthTokensResponse>, ApiError> {
    let tokens = state
        .auth_service
        .refresh_tokens(&request.refresh_token)
        .await?;

    Ok(Json(tokens))
}

/// POST /auth/logout - Revoke the current session
pub async fn logout(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<StatusCode, ApiError> {
    state.auth_service.revoke_session(&user.jti).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /auth/verify-email - Consume an e-mail verification token
pub async fn verify_email(
    State(state): State<AppState>,
    Json(request): Json<VerifyEmailRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let user_id = state
        .verification_service
        .consume(&request.token, VerificationKind::EmailVerification)
        .await?;

    state.auth_service.mark_email_verified(user_id).await?;

    let user = state.auth_service.get_user_by_id(user_id).await?;

    Ok(Json(user.into()))
}

#[derive(Debug, Serialize)]
pub struct ForgotPasswordResponse {
    /// Raw reset token; handed to the e-mail delivery pipeline.
    pub reset_token: Option<String>,
}

/// POST /auth/forgot-password - Start a password reset
///
/// Responds identically whether or not the address exists, so the endpoint
/// cannot be used to probe for accounts.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(request): Json<ForgotPasswordRequest>,
) -> Result<Json<ForgotPasswordResponse>, ApiError> {
    let user = state.auth_service.get_user_by_email(&request.email).await?;

    let reset_token = match user {
        Some(user) => {
            let (raw_token, _) = state
                .verification_service
                .issue(user.id, VerificationKind::PasswordReset)
                .await?;
            Some(raw_token)
        }
        None => None,
    };

    Ok(Json(ForgotPasswordResponse { reset_token }))
}

/// POST /auth/reset-password - Complete a password reset
///
/// Consumes the token, replaces the password, and revokes every live
/// session of the account.
pub async fn reset_password(
    State(state): State<AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<StatusCode, ApiError> {
    request.validate()?;

    let user_id = state
        .verification_service
        .consume(&request.token, VerificationKind::PasswordReset)
        .await?;

    state
        .auth_service
        .set_password(user_id, &request.new_password)
        .await?;

    let revoked = state.auth_service.revoke_all_sessions(user_id).await?;
    tracing::info!(user_id = %user_id, revoked, "Password reset; sessions revoked");

    Ok(StatusCode::NO_CONTENT)
}
