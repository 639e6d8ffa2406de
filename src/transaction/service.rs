//! Transaction service layer - payment intents and the status state machine
//!
//! Wallet effects commit only on confirmation, inside the same database
//! transaction as the status change. Provider failures leave the wallet
//! untouched; compensation is always an explicit refund row.

use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::transaction::{
    insert_transaction, CreateManualTransactionRequest, NewTransaction, StripeClient, StripeError,
    Transaction, TransactionKind, TransactionProvider, TransactionStats, TransactionStatus,
};

/// Transaction service errors
#[derive(Error, Debug)]
pub enum TransactionError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Transaction not found")]
    NotFound,

    #[error("Wallet not found")]
    WalletNotFound,

    #[error("Amount must be greater than zero")]
    InvalidAmount,

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Payment provider error: {0}")]
    Provider(String),

    #[error("Payment not completed by provider (status: {0})")]
    PaymentIncomplete(String),
}

impl From<sqlx::Error> for TransactionError {
    fn from(e: sqlx::Error) -> Self {
        TransactionError::DatabaseError(e.to_string())
    }
}

impl From<StripeError> for TransactionError {
    fn from(e: StripeError) -> Self {
        TransactionError::Provider(e.to_string())
    }
}

/// Transaction service for payment flows and ledger queries
#[derive(Clone)]
pub struct TransactionService {
    db_pool: PgPool,
    stripe: StripeClient,
    default_currency: String,
}

impl TransactionService {
    pub fn new(db_pool: PgPool, stripe: StripeClient, default_currency: String) -> Self {
        Self {
            db_pool,
            stripe,
            default_currency,
        }
    }

    /// Open a provider payment intent and record it as a pending credit
    ///
    /// No balance effect yet; the wallet is credited on confirmation.
    pub async fn create_stripe_payment_intent(
        &self,
        user_id: Uuid,
        amount: i64,
        currency: Option<String>,
        reason: Option<String>,
    ) -> Result<(String, Transaction), TransactionError> {
        if amount <= 0 {
            return Err(TransactionError::InvalidAmount);
        }

        let currency = currency.unwrap_or_else(|| self.default_currency.clone());

        let wallet_id: (Uuid,) = sqlx::query_as("SELECT id FROM wallets WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or(TransactionError::WalletNotFound)?;

        let intent = self.stripe.create_payment_intent(amount, &currency).await?;

        let mut db_tx = self.db_pool.begin().await?;

        let transaction = insert_transaction(
            &mut db_tx,
            NewTransaction {
                wallet_id: Some(wallet_id.0),
                user_id,
                amount,
                currency,
                kind: TransactionKind::Credit,
                reason: reason.or_else(|| Some("Wallet top up".to_string())),
                provider: TransactionProvider::Stripe,
                provider_payment_id: Some(intent.id.clone()),
                related_contract: None,
                related_milestone: None,
                status: TransactionStatus::Pending,
            },
        )
        .await?;

        db_tx.commit().await?;

        let client_secret = intent
            .client_secret
            .unwrap_or_else(|| format!("{}_secret", intent.id));

        Ok((client_secret, transaction))
    }

    /// Confirm a provider payment and commit the wallet credit
    ///
    /// On provider success the pending transaction becomes `succeeded` and
    /// the wallet balance is credited, both in one database transaction.
    /// Anything else marks the transaction `failed`; the wallet is never
    /// rolled back because it was never touched.
    pub async fn confirm_stripe_payment(
        &self,
        payment_intent_id: &str,
    ) -> Result<Transaction, TransactionError> {
        let intent = self.stripe.retrieve_payment_intent(payment_intent_id).await?;

        if intent.status != "succeeded" {
            // Settle the pending row as failed; leave terminal rows alone
            sqlx::query(
                r#"
                UPDATE transactions
                SET status = 'failed', updated_at = NOW()
                WHERE provider_payment_id = $1 AND status = 'pending'
                "#,
            )
            .bind(payment_intent_id)
            .execute(&self.db_pool)
            .await?;

            return Err(TransactionError::PaymentIncomplete(intent.status));
        }

        let mut db_tx = self.db_pool.begin().await?;

        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            UPDATE transactions
            SET status = 'succeeded', updated_at = NOW()
            WHERE provider_payment_id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(payment_intent_id)
        .fetch_optional(&mut *db_tx)
        .await?;

        let transaction = match transaction {
            Some(t) => t,
            None => {
                db_tx.rollback().await?;
                // Either the intent is unknown or the row already settled
                let existing = self.find_by_provider_id(payment_intent_id).await?;
                return match existing {
                    Some(t) => Err(TransactionError::InvalidTransition {
                        from: t.status.as_str().to_string(),
                        to: TransactionStatus::Succeeded.as_str().to_string(),
                    }),
                    None => Err(TransactionError::NotFound),
                };
            }
        };

        if let Some(wallet_id) = transaction.wallet_id {
            sqlx::query(
                "UPDATE wallets SET balance = balance + $1, updated_at = NOW() WHERE id = $2",
            )
            .bind(transaction.amount)
            .bind(wallet_id)
            .execute(&mut *db_tx)
            .await?;
        }

        db_tx.commit().await?;

        tracing::info!(
            transaction_id = %transaction.id,
            payment_intent_id,
            "Payment confirmed and wallet credited"
        );

        Ok(transaction)
    }

    /// Refund a succeeded provider payment
    ///
    /// Valid only from `succeeded`. Issues the provider refund, marks the
    /// row `refunded`, and records the compensating debit that takes the
    /// earlier credit back out of the wallet.
    pub async fn refund_stripe_payment(&self, id: Uuid) -> Result<Transaction, TransactionError> {
        let original = self
            .get_transaction(id)
            .await?
            .ok_or(TransactionError::NotFound)?;

        if original.provider != TransactionProvider::Stripe {
            return Err(TransactionError::Provider(
                "Transaction was not made through Stripe".to_string(),
            ));
        }

        if !original.status.can_transition(TransactionStatus::Refunded) {
            return Err(TransactionError::InvalidTransition {
                from: original.status.as_str().to_string(),
                to: TransactionStatus::Refunded.as_str().to_string(),
            });
        }

        let payment_intent_id = original
            .provider_payment_id
            .clone()
            .ok_or(TransactionError::Provider("Missing provider id".to_string()))?;

        let refund = self.stripe.create_refund(&payment_intent_id).await?;

        let mut db_tx = self.db_pool.begin().await?;

        let updated = sqlx::query_as::<_, Transaction>(
            r#"
            UPDATE transactions
            SET status = 'refunded', updated_at = NOW()
            WHERE id = $1 AND status = 'succeeded'
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *db_tx)
        .await?
        .ok_or(TransactionError::InvalidTransition {
            from: original.status.as_str().to_string(),
            to: TransactionStatus::Refunded.as_str().to_string(),
        })?;

        if let Some(wallet_id) = updated.wallet_id {
            sqlx::query(
                "UPDATE wallets SET balance = balance - $1, updated_at = NOW() WHERE id = $2",
            )
            .bind(updated.amount)
            .bind(wallet_id)
            .execute(&mut *db_tx)
            .await?;

            insert_transaction(
                &mut db_tx,
                NewTransaction {
                    wallet_id: Some(wallet_id),
                    user_id: updated.user_id,
                    amount: updated.amount,
                    currency: updated.currency.clone(),
                    kind: TransactionKind::Refund,
                    reason: Some(format!("Refund of {}", payment_intent_id)),
                    provider: TransactionProvider::Stripe,
                    provider_payment_id: Some(refund.id),
                    related_contract: updated.related_contract,
                    related_milestone: updated.related_milestone,
                    status: TransactionStatus::Succeeded,
                },
            )
            .await?;
        }

        db_tx.commit().await?;

        tracing::info!(transaction_id = %id, "Payment refunded");

        Ok(updated)
    }

    /// Admin-initiated transaction bypassing the provider
    pub async fn create_manual_transaction(
        &self,
        admin_id: Uuid,
        request: CreateManualTransactionRequest,
    ) -> Result<Transaction, TransactionError> {
        if request.amount <= 0 {
            return Err(TransactionError::InvalidAmount);
        }

        let wallet: Option<(Uuid, Uuid)> =
            sqlx::query_as("SELECT id, user_id FROM wallets WHERE id = $1")
                .bind(request.wallet_id)
                .fetch_optional(&self.db_pool)
                .await?;

        let (wallet_id, owner_id) = wallet.ok_or(TransactionError::WalletNotFound)?;

        let mut db_tx = self.db_pool.begin().await?;

        let transaction = insert_transaction(
            &mut db_tx,
            NewTransaction {
                wallet_id: Some(wallet_id),
                user_id: owner_id,
                amount: request.amount,
                currency: request.currency,
                kind: request.kind,
                reason: Some(request.reason),
                provider: request.provider,
                provider_payment_id: None,
                related_contract: None,
                related_milestone: None,
                status: TransactionStatus::Pending,
            },
        )
        .await?;

        db_tx.commit().await?;

        tracing::info!(
            admin_id = %admin_id,
            transaction_id = %transaction.id,
            "Manual transaction created"
        );

        Ok(transaction)
    }

    /// Get a single transaction by ID
    pub async fn get_transaction(&self, id: Uuid) -> Result<Option<Transaction>, TransactionError> {
        let transaction =
            sqlx::query_as::<_, Transaction>("SELECT * FROM transactions WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.db_pool)
                .await?;

        Ok(transaction)
    }

    /// List a user's transactions, newest first
    pub async fn list_user_transactions(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Transaction>, TransactionError> {
        let transactions = sqlx::query_as::<_, Transaction>(
            "SELECT * FROM transactions WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(transactions)
    }

    /// Admin status override, checked against the status graph
    pub async fn update_status(
        &self,
        id: Uuid,
        new_status: TransactionStatus,
    ) -> Result<Transaction, TransactionError> {
        let current = self
            .get_transaction(id)
            .await?
            .ok_or(TransactionError::NotFound)?;

        if !current.status.can_transition(new_status) {
            return Err(TransactionError::InvalidTransition {
                from: current.status.as_str().to_string(),
                to: new_status.as_str().to_string(),
            });
        }

        // Guard on the old status so concurrent updates cannot double-apply
        let updated = sqlx::query_as::<_, Transaction>(
            r#"
            UPDATE transactions
            SET status = $1, updated_at = NOW()
            WHERE id = $2 AND status = $3
            RETURNING *
            "#,
        )
        .bind(new_status)
        .bind(id)
        .bind(current.status)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or(TransactionError::InvalidTransition {
            from: current.status.as_str().to_string(),
            to: new_status.as_str().to_string(),
        })?;

        Ok(updated)
    }

    /// Per-status totals for the admin dashboard
    pub async fn admin_stats(&self) -> Result<Vec<TransactionStats>, TransactionError> {
        let stats = sqlx::query_as::<_, TransactionStats>(
            r#"
            SELECT status, COALESCE(SUM(amount), 0)::BIGINT AS total_amount, COUNT(*) AS count
            FROM transactions
            GROUP BY status
            ORDER BY status
            "#,
        )
        .fetch_all(&self.db_pool)
        .await?;

        Ok(stats)
    }

    async fn find_by_provider_id(
        &self,
        provider_payment_id: &str,
    ) -> Result<Option<Transaction>, TransactionError> {
        let transaction = sqlx::query_as::<_, Transaction>(
            "SELECT * FROM transactions WHERE provider_payment_id = $1",
        )
        .bind(provider_payment_id)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(transaction)
    }
}
