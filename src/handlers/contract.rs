//! Contract HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::contract::{
    Contract, ContractError, ContractStats, ContractWithMilestones, CreateContractRequest,
    UpdateContractRequest, UpdateContractStatusRequest, UpdateEscrowStatusRequest,
};
use crate::error::ApiError;
use crate::handlers::{AdminUser, AuthenticatedUser};
use crate::models::UserRole;
use crate::state::AppState;

impl From<ContractError> for ApiError {
    fn from(e: ContractError) -> Self {
        match e {
            ContractError::NotFound => ApiError::NotFound("Contract not found".to_string()),
            ContractError::ProposalNotFound => {
                ApiError::NotFound("Proposal not found".to_string())
            }
            ContractError::ProposalNotAccepted => {
                ApiError::ValidationError("The proposal has not been accepted".to_string())
            }
            ContractError::NotJobClient => {
                ApiError::Forbidden("Only the job's client can create this contract".to_string())
            }
            ContractError::InvalidTransition { from, to } => {
                ApiError::InvalidTransition(format!("{} -> {}", from, to))
            }
            ContractError::DatabaseError(msg) => ApiError::DatabaseError(msg),
        }
    }
}

/// POST /contracts - Create a contract from an accepted proposal
pub async fn create_contract(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateContractRequest>,
) -> Result<(StatusCode, Json<Contract>), ApiError> {
    let contract = state
        .contract_service
        .create_contract(
            user.user_id,
            request.proposal_id,
            request.start_date,
            request.end_date,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(contract)))
}

/// GET /contracts/me - The caller's contracts with milestones embedded
pub async fn get_my_contracts(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<ContractWithMilestones>>, ApiError> {
    let contracts = state.contract_service.get_my_contracts(user.user_id).await?;
    Ok(Json(contracts))
}

/// GET /contracts/:id - Fetch a single contract (party or admin)
pub async fn get_contract_by_id(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Contract>, ApiError> {
    let contract = state
        .contract_service
        .get_contract(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Contract not found".to_string()))?;

    if !contract.is_party(user.user_id) && user.role != UserRole::Admin {
        return Err(ApiError::Forbidden(
            "You are not a party to this contract".to_string(),
        ));
    }

    Ok(Json(contract))
}

/// PUT /contracts/:id - Amend contract terms (party-only)
pub async fn update_contract(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateContractRequest>,
) -> Result<Json<Contract>, ApiError> {
    ensure_party(&state, id, &user).await?;

    let contract = state.contract_service.update_contract(id, request).await?;

    Ok(Json(contract))
}

/// PUT /contracts/:id/status - Move the contract status (party-only)
pub async fn update_contract_status(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateContractStatusRequest>,
) -> Result<Json<Contract>, ApiError> {
    ensure_party(&state, id, &user).await?;

    let contract = state.contract_service.update_status(id, request.status).await?;

    Ok(Json(contract))
}

/// PUT /contracts/:id/escrow - Move the escrow state (party-only)
pub async fn update_escrow_status(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateEscrowStatusRequest>,
) -> Result<Json<Contract>, ApiError> {
    ensure_party(&state, id, &user).await?;

    let contract = state
        .contract_service
        .update_escrow_status(id, request.escrow_status)
        .await?;

    Ok(Json(contract))
}

/// DELETE /contracts/:id - Remove a contract (admin only)
pub async fn delete_contract(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.contract_service.delete_contract(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /contracts/admin/stats - Per-status aggregates
pub async fn get_admin_contract_stats(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Vec<ContractStats>>, ApiError> {
    let stats = state.contract_service.admin_stats().await?;
    Ok(Json(stats))
}

async fn ensure_party(
    state: &AppState,
    contract_id: Uuid,
    user: &AuthenticatedUser,
) -> Result<(), ApiError> {
    let contract = state
        .contract_service
        .get_contract(contract_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Contract not found".to_string()))?;

    if !contract.is_party(user.user_id) && user.role != UserRole::Admin {
        return Err(ApiError::Forbidden(
            "You are not a party to this contract".to_string(),
        ));
    }

    Ok(())
}
