//! Proposal HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::handlers::{AdminUser, AuthenticatedUser};
use crate::models::UserRole;
use crate::proposal::{
    Proposal, ProposalError, SubmitProposalRequest, UpdateProposalStatusRequest,
};
use crate::state::AppState;

impl From<ProposalError> for ApiError {
    fn from(e: ProposalError) -> Self {
        match e {
            ProposalError::NotFound => ApiError::NotFound("Proposal not found".to_string()),
            ProposalError::JobNotFound => ApiError::NotFound("Job not found".to_string()),
            ProposalError::JobNotOpen => {
                ApiError::ValidationError("Job is not open for proposals".to_string())
            }
            ProposalError::NotOwner => {
                ApiError::Forbidden("Only the proposal's freelancer may do this".to_string())
            }
            ProposalError::NotJobClient => {
                ApiError::Forbidden("Only the job's client may do this".to_string())
            }
            ProposalError::NotPending(action) => ApiError::InvalidTransition(format!(
                "only a pending proposal can be {}",
                action
            )),
            ProposalError::AcceptedImmutable => {
                ApiError::Conflict("Accepted proposals cannot be deleted".to_string())
            }
            ProposalError::InvalidAmount => {
                ApiError::ValidationError("Amount must be greater than zero".to_string())
            }
            ProposalError::DatabaseError(msg) => ApiError::DatabaseError(msg),
        }
    }
}

/// POST /proposals - Submit a proposal (freelancer role)
pub async fn submit_proposal(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<SubmitProposalRequest>,
) -> Result<(StatusCode, Json<Proposal>), ApiError> {
    request.validate()?;

    if user.role != UserRole::Freelancer {
        return Err(ApiError::Forbidden(
            "Only freelancers can submit proposals".to_string(),
        ));
    }

    let proposal = state.proposal_service.submit(user.user_id, request).await?;

    Ok((StatusCode::CREATED, Json(proposal)))
}

/// PUT /proposals/:id/withdraw - Withdraw an own pending proposal
pub async fn withdraw_proposal(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Proposal>, ApiError> {
    let proposal = state.proposal_service.withdraw(user.user_id, id).await?;
    Ok(Json(proposal))
}

/// GET /proposals/me - The caller's proposals
pub async fn get_my_proposals(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Proposal>>, ApiError> {
    let proposals = state.proposal_service.get_mine(user.user_id).await?;
    Ok(Json(proposals))
}

/// GET /proposals/job/:job_id - Proposals on a job (job's client only)
pub async fn get_job_proposals(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(job_id): Path<Uuid>,
) -> Result<Json<Vec<Proposal>>, ApiError> {
    let proposals = state
        .proposal_service
        .get_job_proposals(user.user_id, job_id)
        .await?;

    Ok(Json(proposals))
}

/// GET /proposals/:id - Fetch a single proposal
pub async fn get_proposal_by_id(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Proposal>, ApiError> {
    let proposal = state.proposal_service.get_by_id(id).await?;
    Ok(Json(proposal))
}

/// PUT /proposals/:id/status - Accept or reject a pending proposal
pub async fn update_proposal_status(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateProposalStatusRequest>,
) -> Result<Json<Proposal>, ApiError> {
    let proposal = state
        .proposal_service
        .update_status(user.user_id, id, request.status)
        .await?;

    Ok(Json(proposal))
}

/// DELETE /proposals/:id - Delete an own, non-accepted proposal
pub async fn delete_proposal(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.proposal_service.delete(user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /proposals/admin - All proposals (admin dashboard)
pub async fn get_admin_proposals(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Vec<Proposal>>, ApiError> {
    let proposals = state.proposal_service.admin_list().await?;
    Ok(Json(proposals))
}
