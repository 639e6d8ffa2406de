//! Transaction models and data structures

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

/// Direction/category of a ledger transaction
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "transaction_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Credit,
    Debit,
    Payout,
    Fee,
    Refund,
}

/// Originating provider of a transaction
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "transaction_provider", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionProvider {
    Stripe,
    Wallet,
    Bank,
}

/// Transaction lifecycle status
///
/// Transitions are monotonic forward: `pending` settles to `succeeded` or
/// `failed`, and only `succeeded` can later become `refunded`. Terminal
/// rows are otherwise immutable.
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "transaction_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Succeeded,
    Failed,
    Refunded,
}

impl TransactionStatus {
    /// Whether the status graph permits moving from `self` to `to`
    pub fn can_transition(self, to: TransactionStatus) -> bool {
        use TransactionStatus::*;
        matches!(
            (self, to),
            (Pending, Succeeded) | (Pending, Failed) | (Succeeded, Refunded)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Succeeded => "succeeded",
            TransactionStatus::Failed => "failed",
            TransactionStatus::Refunded => "refunded",
        }
    }
}

/// Ledger transaction record
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Transaction {
    pub id: Uuid,
    pub wallet_id: Option<Uuid>,
    pub user_id: Uuid,
    pub amount: i64,
    pub currency: String,
    pub kind: TransactionKind,
    pub reason: Option<String>,
    pub provider: TransactionProvider,
    pub provider_payment_id: Option<String>,
    pub related_contract: Option<Uuid>,
    pub related_milestone: Option<Uuid>,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for inserting a new transaction row
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub wallet_id: Option<Uuid>,
    pub user_id: Uuid,
    pub amount: i64,
    pub currency: String,
    pub kind: TransactionKind,
    pub reason: Option<String>,
    pub provider: TransactionProvider,
    pub provider_payment_id: Option<String>,
    pub related_contract: Option<Uuid>,
    pub related_milestone: Option<Uuid>,
    pub status: TransactionStatus,
}

/// Insert a transaction row inside an open database transaction
///
/// Ledger writes always ride the same database transaction as the balance
/// mutation they record, so a partial write cannot occur.
pub async fn insert_transaction(
    db_tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    new: NewTransaction,
) -> Result<Transaction, sqlx::Error> {
    sqlx::query_as::<_, Transaction>(
        r#"
        INSERT INTO transactions (
            id, wallet_id, user_id, amount, currency, kind, reason,
            provider, provider_payment_id, related_contract, related_milestone, status
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(new.wallet_id)
    .bind(new.user_id)
    .bind(new.amount)
    .bind(&new.currency)
    .bind(new.kind)
    .bind(&new.reason)
    .bind(new.provider)
    .bind(&new.provider_payment_id)
    .bind(new.related_contract)
    .bind(new.related_milestone)
    .bind(new.status)
    .fetch_one(&mut **db_tx)
    .await
}

// ============================================================================
// Request/Response DTOs
// ============================================================================

/// Request to open a provider payment intent
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePaymentIntentRequest {
    #[validate(range(min = 1))]
    pub amount: i64,
    pub currency: Option<String>,
    pub reason: Option<String>,
}

/// Response carrying the provider client secret
#[derive(Debug, Serialize)]
pub struct PaymentIntentResponse {
    pub client_secret: String,
    pub transaction_id: Uuid,
}

/// Request to confirm a provider payment
#[derive(Debug, Deserialize)]
pub struct ConfirmPaymentRequest {
    pub payment_intent_id: String,
}

/// Admin-initiated transaction bypassing the provider
#[derive(Debug, Deserialize, Validate)]
pub struct CreateManualTransactionRequest {
    pub wallet_id: Uuid,
    #[validate(range(min = 1))]
    pub amount: i64,
    pub currency: String,
    pub kind: TransactionKind,
    #[validate(length(min = 1))]
    pub reason: String,
    pub provider: TransactionProvider,
}

/// Admin status override request (graph-checked)
#[derive(Debug, Deserialize)]
pub struct UpdateTransactionStatusRequest {
    pub status: TransactionStatus,
}

/// Per-status aggregate for the admin dashboard
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct TransactionStats {
    pub status: TransactionStatus,
    pub total_amount: i64,
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_graph_forward_edges() {
        use TransactionStatus::*;
        assert!(Pending.can_transition(Succeeded));
        assert!(Pending.can_transition(Failed));
        assert!(Succeeded.can_transition(Refunded));
    }

    #[test]
    fn test_status_graph_rejects_everything_else() {
        use TransactionStatus::*;
        let all = [Pending, Succeeded, Failed, Refunded];
        for from in all {
            for to in all {
                let allowed = matches!(
                    (from, to),
                    (Pending, Succeeded) | (Pending, Failed) | (Succeeded, Refunded)
                );
                assert_eq!(from.can_transition(to), allowed, "{:?} -> {:?}", from, to);
            }
        }
    }

    #[test]
    fn test_no_exit_from_terminal_states() {
        use TransactionStatus::*;
        for to in [Pending, Succeeded, Failed, Refunded] {
            assert!(!Failed.can_transition(to));
            assert!(!Refunded.can_transition(to));
        }
    }
}
