//! Milestone HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::handlers::{AdminUser, AuthenticatedUser};
use crate::milestone::{
    AttachFileRequest, CreateMilestoneRequest, Milestone, MilestoneAttachment, MilestoneError,
    MilestoneStatusResponse, MilestoneWithAttachments, UpdateMilestoneRequest,
    UpdateMilestoneStatusRequest,
};
use crate::state::AppState;

impl From<MilestoneError> for ApiError {
    fn from(e: MilestoneError) -> Self {
        match e {
            MilestoneError::NotFound => ApiError::NotFound("Milestone not found".to_string()),
            MilestoneError::ContractNotFound => {
                ApiError::NotFound("Contract not found".to_string())
            }
            MilestoneError::ContractClosed => {
                ApiError::ValidationError("Contract is no longer active".to_string())
            }
            MilestoneError::NotContractParty => ApiError::Forbidden(
                "Only the contract's client or freelancer may do this".to_string(),
            ),
            MilestoneError::InvalidAmount => {
                ApiError::ValidationError("Amount must be greater than zero".to_string())
            }
            MilestoneError::InvalidTransition { from, to } => {
                ApiError::InvalidTransition(format!("{} -> {}", from, to))
            }
            MilestoneError::CompletedImmutable => {
                ApiError::Conflict("Completed milestones cannot be changed".to_string())
            }
            MilestoneError::DatabaseError(msg) => ApiError::DatabaseError(msg),
        }
    }
}

/// POST /milestones - Create a milestone under a contract
pub async fn create_milestone(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateMilestoneRequest>,
) -> Result<(StatusCode, Json<Milestone>), ApiError> {
    request.validate()?;

    let milestone = state
        .milestone_service
        .create_milestone(user.user_id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(milestone)))
}

/// PUT /milestones/:id/status - Move a milestone along its state machine
pub async fn update_milestone_status(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateMilestoneStatusRequest>,
) -> Result<Json<MilestoneStatusResponse>, ApiError> {
    let (milestone, contract_completed) = state
        .milestone_service
        .update_status(user.user_id, id, request.status)
        .await?;

    Ok(Json(MilestoneStatusResponse {
        milestone,
        contract_completed,
    }))
}

/// PUT /milestones/:id - Amend milestone fields
pub async fn update_milestone(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateMilestoneRequest>,
) -> Result<Json<Milestone>, ApiError> {
    request.validate()?;

    let milestone = state
        .milestone_service
        .update_milestone(user.user_id, id, request)
        .await?;

    Ok(Json(milestone))
}

/// POST /milestones/:id/attachments - Attach a file reference
pub async fn attach_file(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<AttachFileRequest>,
) -> Result<(StatusCode, Json<MilestoneAttachment>), ApiError> {
    request.validate()?;

    let attachment = state
        .milestone_service
        .attach_file(user.user_id, id, &request.url, request.public_id, request.mime_type)
        .await?;

    Ok((StatusCode::CREATED, Json(attachment)))
}

/// GET /milestones/contract/:contract_id - Milestones of a contract
pub async fn get_milestones(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(contract_id): Path<Uuid>,
) -> Result<Json<Vec<Milestone>>, ApiError> {
    let milestones = state
        .milestone_service
        .get_by_contract(user.user_id, contract_id)
        .await?;

    Ok(Json(milestones))
}

/// GET /milestones/:id - Fetch a milestone with attachments
pub async fn get_milestone_by_id(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MilestoneWithAttachments>, ApiError> {
    let milestone = state.milestone_service.get_by_id(id).await?;
    Ok(Json(milestone))
}

/// DELETE /milestones/:id - Delete a non-completed milestone
pub async fn delete_milestone(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .milestone_service
        .delete_milestone(user.user_id, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /milestones/admin - All milestones, newest first
pub async fn get_admin_milestones(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Vec<Milestone>>, ApiError> {
    let milestones = state.milestone_service.admin_list().await?;
    Ok(Json(milestones))
}
