//! Wallet service layer - balance and hold bookkeeping
//!
//! Balance arithmetic is done with single guarded UPDATE statements so
//! concurrent requests serialize at the storage layer; there is no
//! read-modify-write window. The guard for debits includes active holds:
//! `balance - amount >= sum(holds)`.

use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::transaction::{
    insert_transaction, NewTransaction, Transaction, TransactionKind, TransactionProvider,
    TransactionStatus,
};
use crate::wallet::{Wallet, WalletHold, WalletSnapshot};

/// Wallet service errors
#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Wallet already exists")]
    AlreadyExists,

    #[error("Wallet not found")]
    NotFound,

    #[error("Hold not found")]
    HoldNotFound,

    #[error("Amount must be greater than zero")]
    InvalidAmount,

    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: i64, available: i64 },
}

impl From<sqlx::Error> for WalletError {
    fn from(e: sqlx::Error) -> Self {
        WalletError::DatabaseError(e.to_string())
    }
}

/// Wallet service managing the ledger for all users
#[derive(Clone)]
pub struct WalletService {
    db_pool: PgPool,
    default_currency: String,
}

impl WalletService {
    pub fn new(db_pool: PgPool, default_currency: String) -> Self {
        Self {
            db_pool,
            default_currency,
        }
    }

    /// Create a wallet for a user; fails if one already exists
    pub async fn create_wallet(&self, user_id: Uuid) -> Result<Wallet, WalletError> {
        let wallet = sqlx::query_as::<_, Wallet>(
            r#"
            INSERT INTO wallets (id, user_id, balance, currency)
            VALUES ($1, $2, 0, $3)
            ON CONFLICT (user_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&self.default_currency)
        .fetch_optional(&self.db_pool)
        .await?;

        wallet.ok_or(WalletError::AlreadyExists)
    }

    /// Fetch a wallet with its holds
    pub async fn get_wallet(&self, user_id: Uuid) -> Result<WalletSnapshot, WalletError> {
        let wallet = sqlx::query_as::<_, Wallet>("SELECT * FROM wallets WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or(WalletError::NotFound)?;

        let holds = self.holds_for(wallet.id).await?;

        Ok(WalletSnapshot::new(wallet, holds))
    }

    /// Fetch a wallet, creating it lazily on first access
    pub async fn get_or_create_wallet(&self, user_id: Uuid) -> Result<WalletSnapshot, WalletError> {
        sqlx::query(
            r#"
            INSERT INTO wallets (id, user_id, balance, currency)
            VALUES ($1, $2, 0, $3)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&self.default_currency)
        .execute(&self.db_pool)
        .await?;

        self.get_wallet(user_id).await
    }

    /// Fetch a wallet row by its id (provider flows reference wallets directly)
    pub async fn get_wallet_by_id(&self, wallet_id: Uuid) -> Result<Wallet, WalletError> {
        sqlx::query_as::<_, Wallet>("SELECT * FROM wallets WHERE id = $1")
            .bind(wallet_id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or(WalletError::NotFound)
    }

    /// Credit the wallet and record a succeeded credit transaction
    pub async fn deposit(&self, user_id: Uuid, amount: i64) -> Result<Transaction, WalletError> {
        if amount <= 0 {
            return Err(WalletError::InvalidAmount);
        }

        let mut db_tx = self.db_pool.begin().await?;

        let wallet = sqlx::query_as::<_, Wallet>(
            r#"
            UPDATE wallets
            SET balance = balance + $1, updated_at = NOW()
            WHERE user_id = $2
            RETURNING *
            "#,
        )
        .bind(amount)
        .bind(user_id)
        .fetch_optional(&mut *db_tx)
        .await?
        .ok_or(WalletError::NotFound)?;

        let transaction = insert_transaction(
            &mut db_tx,
            NewTransaction {
                wallet_id: Some(wallet.id),
                user_id,
                amount,
                currency: wallet.currency.clone(),
                kind: TransactionKind::Credit,
                reason: Some("Wallet top up".to_string()),
                provider: TransactionProvider::Wallet,
                provider_payment_id: None,
                related_contract: None,
                related_milestone: None,
                status: TransactionStatus::Succeeded,
            },
        )
        .await?;

        db_tx.commit().await?;

        tracing::info!(user_id = %user_id, amount, "Funds deposited");

        Ok(transaction)
    }

    /// Debit the wallet and record a succeeded debit transaction
    ///
    /// The guarded UPDATE keeps `balance - amount` at or above the sum of
    /// active holds, so reservations can never be spent out from under a
    /// contract.
    pub async fn withdraw(
        &self,
        user_id: Uuid,
        amount: i64,
        reason: &str,
    ) -> Result<Transaction, WalletError> {
        if amount <= 0 {
            return Err(WalletError::InvalidAmount);
        }

        let mut db_tx = self.db_pool.begin().await?;

        let wallet = sqlx::query_as::<_, Wallet>(
            r#"
            UPDATE wallets w
            SET balance = balance - $1, updated_at = NOW()
            WHERE w.user_id = $2
              AND w.balance - $1 >= COALESCE(
                  (SELECT SUM(h.amount) FROM wallet_holds h WHERE h.wallet_id = w.id), 0)
            RETURNING *
            "#,
        )
        .bind(amount)
        .bind(user_id)
        .fetch_optional(&mut *db_tx)
        .await?;

        let wallet = match wallet {
            Some(w) => w,
            None => {
                // Distinguish a missing wallet from an insufficient balance
                db_tx.rollback().await?;
                let snapshot = self.get_wallet(user_id).await?;
                return Err(WalletError::InsufficientFunds {
                    requested: amount,
                    available: snapshot.available,
                });
            }
        };

        let transaction = insert_transaction(
            &mut db_tx,
            NewTransaction {
                wallet_id: Some(wallet.id),
                user_id,
                amount,
                currency: wallet.currency.clone(),
                kind: TransactionKind::Debit,
                reason: Some(reason.to_string()),
                provider: TransactionProvider::Wallet,
                provider_payment_id: None,
                related_contract: None,
                related_milestone: None,
                status: TransactionStatus::Succeeded,
            },
        )
        .await?;

        db_tx.commit().await?;

        tracing::info!(user_id = %user_id, amount, reason, "Funds withdrawn");

        Ok(transaction)
    }

    /// Reserve an amount without changing the balance
    ///
    /// The INSERT only lands when `balance - sum(holds) >= amount`, checked
    /// in the same statement.
    pub async fn hold(
        &self,
        user_id: Uuid,
        amount: i64,
        reason: &str,
        related_id: Option<Uuid>,
    ) -> Result<WalletHold, WalletError> {
        if amount <= 0 {
            return Err(WalletError::InvalidAmount);
        }

        let hold = sqlx::query_as::<_, WalletHold>(
            r#"
            INSERT INTO wallet_holds (id, wallet_id, amount, reason, related_id)
            SELECT $1, w.id, $2, $3, $4
            FROM wallets w
            WHERE w.user_id = $5
              AND w.balance - COALESCE(
                  (SELECT SUM(h.amount) FROM wallet_holds h WHERE h.wallet_id = w.id), 0) >= $2
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(amount)
        .bind(reason)
        .bind(related_id)
        .bind(user_id)
        .fetch_optional(&self.db_pool)
        .await?;

        match hold {
            Some(h) => {
                tracing::info!(user_id = %user_id, amount, reason, "Funds held");
                Ok(h)
            }
            None => {
                let snapshot = self.get_wallet(user_id).await?;
                Err(WalletError::InsufficientFunds {
                    requested: amount,
                    available: snapshot.available,
                })
            }
        }
    }

    /// Release a hold identified by its related reference
    ///
    /// With `settle = false` the reservation simply dissolves back into the
    /// available balance. With `settle = true` the held amount is debited
    /// and recorded as a payout (contract completion path).
    pub async fn release_hold(
        &self,
        user_id: Uuid,
        related_id: Uuid,
        settle: bool,
    ) -> Result<WalletSnapshot, WalletError> {
        let mut db_tx = self.db_pool.begin().await?;

        let released: Option<(Uuid, i64, String)> = sqlx::query_as(
            r#"
            DELETE FROM wallet_holds h
            USING wallets w
            WHERE h.wallet_id = w.id AND w.user_id = $1 AND h.related_id = $2
            RETURNING w.id, h.amount, h.reason
            "#,
        )
        .bind(user_id)
        .bind(related_id)
        .fetch_optional(&mut *db_tx)
        .await?;

        let (wallet_id, amount, reason) = released.ok_or(WalletError::HoldNotFound)?;

        if settle {
            sqlx::query(
                "UPDATE wallets SET balance = balance - $1, updated_at = NOW() WHERE id = $2",
            )
            .bind(amount)
            .bind(wallet_id)
            .execute(&mut *db_tx)
            .await?;

            let currency: (String,) = sqlx::query_as("SELECT currency FROM wallets WHERE id = $1")
                .bind(wallet_id)
                .fetch_one(&mut *db_tx)
                .await?;

            insert_transaction(
                &mut db_tx,
                NewTransaction {
                    wallet_id: Some(wallet_id),
                    user_id,
                    amount,
                    currency: currency.0,
                    kind: TransactionKind::Payout,
                    reason: Some(reason),
                    provider: TransactionProvider::Wallet,
                    provider_payment_id: None,
                    related_contract: Some(related_id),
                    related_milestone: None,
                    status: TransactionStatus::Succeeded,
                },
            )
            .await?;
        }

        db_tx.commit().await?;

        tracing::info!(user_id = %user_id, related_id = %related_id, settle, "Hold released");

        self.get_wallet(user_id).await
    }

    /// List the wallet's transactions, newest first
    pub async fn list_transactions(&self, user_id: Uuid) -> Result<Vec<Transaction>, WalletError> {
        let wallet = sqlx::query_as::<_, Wallet>("SELECT * FROM wallets WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or(WalletError::NotFound)?;

        let transactions = sqlx::query_as::<_, Transaction>(
            "SELECT * FROM transactions WHERE wallet_id = $1 ORDER BY created_at DESC",
        )
        .bind(wallet.id)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(transactions)
    }

    async fn holds_for(&self, wallet_id: Uuid) -> Result<Vec<WalletHold>, WalletError> {
        let holds = sqlx::query_as::<_, WalletHold>(
            "SELECT * FROM wallet_holds WHERE wallet_id = $1 ORDER BY created_at",
        )
        .bind(wallet_id)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(holds)
    }
}
