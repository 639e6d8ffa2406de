//! Transaction HTTP handlers

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
use crate::state::AppState;
use crate::transaction::{
    ConfirmPaymentRequest, CreateManualTransactionRequest, CreatePaymentIntentRequest,
    PaymentIntentResponse, Transaction, TransactionError, TransactionStats,
    UpdateTransactionStatusRequest,
};

impl From<TransactionError> for ApiError {
    fn from(e: TransactionError) -> Self {
        match e {
            TransactionError::NotFound => ApiError::NotFound("Transaction not found".to_string()),
            TransactionError::WalletNotFound => ApiError::NotFound("Wallet not found".to_string()),
            TransactionError::InvalidAmount => {
                ApiError::ValidationError("Amount must be greater than zero".to_string())
            }
            TransactionError::InvalidTransition { from, to } => {
                ApiError::InvalidTransition(format!("{} -> {}", from, to))
            }
            TransactionError::Provider(msg) => ApiError::ProviderError(msg),
            TransactionError::PaymentIncomplete(status) => {
                ApiError::ProviderError(format!("Payment not completed (status: {})", status))
            }
            TransactionError::DatabaseError(msg) => ApiError::DatabaseError(msg),
        }
    }
}

/// POST /transactions/stripe/intent - Open a provider payment intent
///
/// Client role only: freelancers are paid out of escrow, they do not fund
/// wallets through the card rails.
pub async fn create_stripe_payment_intent(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreatePaymentIntentRequest>,
) -> Result<(StatusCode, Json<PaymentIntentResponse>), ApiError> {
    request.validate()?;

    if user.role == UserRole::Freelancer {
        return Err(ApiError::Forbidden(
            "Only clients can fund a wallet through the payment provider".to_string(),
        ));
    }

    let (client_secret, transaction) = state
        .transaction_service
        .create_stripe_payment_intent(user.user_id, request.amount, request.currency, request.reason)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PaymentIntentResponse {
            client_secret,
            transaction_id: transaction.id,
        }),
    ))
}

/// POST /transactions/stripe/confirm - Confirm a provider payment
pub async fn confirm_stripe_payment(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(request): Json<ConfirmPaymentRequest>,
) -> Result<Json<Transaction>, ApiError> {
    let transaction = state
        .transaction_service
        .confirm_stripe_payment(&request.payment_intent_id)
        .await?;

    Ok(Json(transaction))
}

/// POST /transactions/:id/refund - Refund a succeeded provider payment
pub async fn refund_stripe_payment(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Transaction>, ApiError> {
    tracing::info!(admin_id = %admin.user_id, transaction_id = %id, "Refund requested");

    let transaction = state.transaction_service.refund_stripe_payment(id).await?;

    Ok(Json(transaction))
}

/// POST /transactions/manual - Admin transaction bypassing the provider
pub async fn create_manual_transaction(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(request): Json<CreateManualTransactionRequest>,
) -> Result<(StatusCode, Json<Transaction>), ApiError> {
    request.validate()?;

    let transaction = state
        .transaction_service
        .create_manual_transaction(admin.user_id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

/// GET /transactions/:id - Fetch a single transaction
///
/// Owners see their own rows; admins see everything.
pub async fn get_transaction_by_id(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Transaction>, ApiError> {
    let transaction = state
        .transaction_service
        .get_transaction(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Transaction not found".to_string()))?;

    if transaction.user_id != user.user_id && user.role != UserRole::Admin {
        return Err(ApiError::Forbidden(
            "You do not have access to this transaction".to_string(),
        ));
    }

    Ok(Json(transaction))
}

/// GET /transactions - The caller's transactions, newest first
pub async fn get_user_transactions(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    let transactions = state
        .transaction_service
        .list_user_transactions(user.user_id)
        .await?;

    Ok(Json(transactions))
}

/// GET /transactions/admin/stats - Per-status totals
pub async fn get_admin_transaction_stats(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Vec<TransactionStats>>, ApiError> {
    let stats = state.transaction_service.admin_stats().await?;
    Ok(Json(stats))
}

/// PUT /transactions/:id/status - Admin status override (graph-checked)
pub async fn update_transaction_status(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTransactionStatusRequest>,
) -> Result<Json<Transaction>, ApiError> {
    let transaction = state
        .transaction_service
        .update_status(id, request.status)
        .await?;

    Ok(Json(transaction))
}
