//! Wallet HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::handlers::AuthenticatedUser;
use crate::state::AppState;
use crate::transaction::Transaction;
use crate::wallet::{
    BalanceResponse, DepositRequest, HoldRequest, ReleaseHoldRequest, WalletError, WalletHold,
    WalletSnapshot, WithdrawRequest,
};

impl From<WalletError> for ApiError {
    fn from(e: WalletError) -> Self {
        match e {
            WalletError::AlreadyExists => ApiError::Conflict("Wallet already exists".to_string()),
            WalletError::NotFound => ApiError::NotFound("Wallet not found".to_string()),
            WalletError::HoldNotFound => ApiError::NotFound("Hold not found".to_string()),
            WalletError::InvalidAmount => {
                ApiError::ValidationError("Amount must be greater than zero".to_string())
            }
            WalletError::InsufficientFunds {
                requested,
                available,
            } => ApiError::InsufficientFunds {
                requested,
                available,
            },
            WalletError::DatabaseError(msg) => ApiError::DatabaseError(msg),
        }
    }
}

/// POST /wallets - Create the caller's wallet
pub async fn create_wallet(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<(StatusCode, Json<WalletSnapshot>), ApiError> {
    let wallet = state.wallet_service.create_wallet(user.user_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(WalletSnapshot::new(wallet, Vec::new())),
    ))
}

/// GET /wallets/me - Fetch the caller's wallet with holds
pub async fn get_wallet(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<WalletSnapshot>, ApiError> {
    let snapshot = state.wallet_service.get_wallet(user.user_id).await?;
    Ok(Json(snapshot))
}

/// GET /wallets/me/balance - Balance only, creating the wallet lazily
pub async fn get_balance(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<BalanceResponse>, ApiError> {
    let snapshot = state
        .wallet_service
        .get_or_create_wallet(user.user_id)
        .await?;

    Ok(Json(BalanceResponse {
        balance: snapshot.wallet.balance,
        available: snapshot.available,
        currency: snapshot.wallet.currency,
    }))
}

/// POST /wallets/deposit - Credit the caller's wallet
pub async fn deposit_funds(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<DepositRequest>,
) -> Result<Json<Transaction>, ApiError> {
    request.validate()?;

    let transaction = state
        .wallet_service
        .deposit(user.user_id, request.amount)
        .await?;

    Ok(Json(transaction))
}

/// POST /wallets/withdraw - Debit the caller's wallet
pub async fn withdraw_funds(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<WithdrawRequest>,
) -> Result<Json<Transaction>, ApiError> {
    request.validate()?;

    let transaction = state
        .wallet_service
        .withdraw(user.user_id, request.amount, &request.reason)
        .await?;

    Ok(Json(transaction))
}

/// POST /wallets/holds - Reserve funds against the caller's wallet
pub async fn hold_funds(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<HoldRequest>,
) -> Result<(StatusCode, Json<WalletHold>), ApiError> {
    request.validate()?;

    let hold = state
        .wallet_service
        .hold(user.user_id, request.amount, &request.reason, request.related_id)
        .await?;

    Ok((StatusCode::CREATED, Json(hold)))
}

/// DELETE /wallets/holds/:related_id - Release (or settle) a hold
pub async fn release_hold(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(related_id): Path<Uuid>,
    Query(request): Query<ReleaseHoldRequest>,
) -> Result<Json<WalletSnapshot>, ApiError> {
    let snapshot = state
        .wallet_service
        .release_hold(user.user_id, related_id, request.settle)
        .await?;

    Ok(Json(snapshot))
}

/// GET /wallets/me/transactions - Ledger entries, newest first
pub async fn get_wallet_transactions(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    let transactions = state.wallet_service.list_transactions(user.user_id).await?;
    Ok(Json(transactions))
}
