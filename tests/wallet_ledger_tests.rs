//! Ledger consistency tests for the wallet service

#[cfg(test)]
mod tests {
    use sqlx::PgPool;
    use uuid::Uuid;

    use gigscape_server::transaction::{TransactionKind, TransactionStatus};
    use gigscape_server::wallet::{WalletError, WalletService};

    /// Helper to create a test database pool
    async fn setup_test_db() -> PgPool {
        let database_url = std::env::var("TEST_DATABASE_URL")
            .unwrap_or_else(|_| "postgresql://localhost/gigscape_test".to_string());

        sqlx::postgres::PgPoolOptions::new()
            .max_connections(1)
            .connect(&database_url)
            .await
            .expect("Failed to connect to test database")
    }

    /// Insert a user row to satisfy foreign keys
    async fn seed_user(pool: &PgPool) -> Uuid {
        let user_id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, role)
            VALUES ($1, 'Ledger Tester', $2, '$2b$12$test', 'client')
            "#,
        )
        .bind(user_id)
        .bind(format!("ledger-{}@test.example", user_id))
        .execute(pool)
        .await
        .expect("Failed to seed user");
        user_id
    }

    fn service(pool: PgPool) -> WalletService {
        WalletService::new(pool, "inr".to_string())
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_deposit_increases_balance_and_records_credit() {
        let pool = setup_test_db().await;
        let user_id = seed_user(&pool).await;
        let wallets = service(pool.clone());

        wallets.create_wallet(user_id).await.unwrap();

        let transaction = wallets.deposit(user_id, 10_000).await.unwrap();
        assert_eq!(transaction.amount, 10_000);
        assert_eq!(transaction.kind, TransactionKind::Credit);
        assert_eq!(transaction.status, TransactionStatus::Succeeded);

        let snapshot = wallets.get_wallet(user_id).await.unwrap();
        assert_eq!(snapshot.wallet.balance, 10_000);
        assert_eq!(snapshot.available, 10_000);

        let ledger = wallets.list_transactions(user_id).await.unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].amount, 10_000);
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_withdraw_respects_balance() {
        let pool = setup_test_db().await;
        let user_id = seed_user(&pool).await;
        let wallets = service(pool.clone());

        wallets.create_wallet(user_id).await.unwrap();
        wallets.deposit(user_id, 10_000).await.unwrap();

        // Withdrawing more than the balance fails and changes nothing
        let result = wallets.withdraw(user_id, 15_000, "test").await;
        assert!(matches!(
            result,
            Err(WalletError::InsufficientFunds {
                requested: 15_000,
                available: 10_000
            })
        ));

        let snapshot = wallets.get_wallet(user_id).await.unwrap();
        assert_eq!(snapshot.wallet.balance, 10_000);

        // A withdrawal within the balance succeeds and records one debit
        let transaction = wallets.withdraw(user_id, 4_000, "test").await.unwrap();
        assert_eq!(transaction.kind, TransactionKind::Debit);
        assert_eq!(transaction.amount, 4_000);

        let snapshot = wallets.get_wallet(user_id).await.unwrap();
        assert_eq!(snapshot.wallet.balance, 6_000);

        let debits: Vec<_> = wallets
            .list_transactions(user_id)
            .await
            .unwrap()
            .into_iter()
            .filter(|t| t.kind == TransactionKind::Debit)
            .collect();
        assert_eq!(debits.len(), 1);
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_hold_reserves_without_touching_balance() {
        let pool = setup_test_db().await;
        let user_id = seed_user(&pool).await;
        let wallets = service(pool.clone());

        wallets.create_wallet(user_id).await.unwrap();
        wallets.deposit(user_id, 10_000).await.unwrap();

        let contract_ref = Uuid::new_v4();
        wallets
            .hold(user_id, 4_000, "escrow", Some(contract_ref))
            .await
            .unwrap();

        // Balance is untouched, but the reserved amount is unavailable
        let snapshot = wallets.get_wallet(user_id).await.unwrap();
        assert_eq!(snapshot.wallet.balance, 10_000);
        assert_eq!(snapshot.available, 6_000);

        // Withdrawals cannot dip into the reservation
        let result = wallets.withdraw(user_id, 7_000, "test").await;
        assert!(matches!(
            result,
            Err(WalletError::InsufficientFunds { .. })
        ));

        // Releasing without settling restores the full available balance
        let snapshot = wallets
            .release_hold(user_id, contract_ref, false)
            .await
            .unwrap();
        assert_eq!(snapshot.wallet.balance, 10_000);
        assert_eq!(snapshot.available, 10_000);
        assert!(snapshot.holds.is_empty());
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_settled_hold_becomes_payout() {
        let pool = setup_test_db().await;
        let user_id = seed_user(&pool).await;
        let wallets = service(pool.clone());

        wallets.create_wallet(user_id).await.unwrap();
        wallets.deposit(user_id, 10_000).await.unwrap();

        let contract_ref = Uuid::new_v4();
        wallets
            .hold(user_id, 4_000, "escrow", Some(contract_ref))
            .await
            .unwrap();

        let snapshot = wallets
            .release_hold(user_id, contract_ref, true)
            .await
            .unwrap();
        assert_eq!(snapshot.wallet.balance, 6_000);
        assert!(snapshot.holds.is_empty());

        let payouts: Vec<_> = wallets
            .list_transactions(user_id)
            .await
            .unwrap()
            .into_iter()
            .filter(|t| t.kind == TransactionKind::Payout)
            .collect();
        assert_eq!(payouts.len(), 1);
        assert_eq!(payouts[0].amount, 4_000);
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_hold_exceeding_available_is_rejected() {
        let pool = setup_test_db().await;
        let user_id = seed_user(&pool).await;
        let wallets = service(pool.clone());

        wallets.create_wallet(user_id).await.unwrap();
        wallets.deposit(user_id, 5_000).await.unwrap();

        wallets.hold(user_id, 3_000, "escrow", None).await.unwrap();

        let result = wallets.hold(user_id, 3_000, "escrow", None).await;
        assert!(matches!(
            result,
            Err(WalletError::InsufficientFunds {
                requested: 3_000,
                available: 2_000
            })
        ));
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_create_wallet_twice_conflicts() {
        let pool = setup_test_db().await;
        let user_id = seed_user(&pool).await;
        let wallets = service(pool.clone());

        wallets.create_wallet(user_id).await.unwrap();

        let result = wallets.create_wallet(user_id).await;
        assert!(matches!(result, Err(WalletError::AlreadyExists)));
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_balance_access_creates_wallet_lazily() {
        let pool = setup_test_db().await;
        let user_id = seed_user(&pool).await;
        let wallets = service(pool.clone());

        // No explicit create; first access materializes an empty wallet
        let snapshot = wallets.get_or_create_wallet(user_id).await.unwrap();
        assert_eq!(snapshot.wallet.balance, 0);
        assert!(snapshot.holds.is_empty());
    }

    #[tokio::test]
    async fn test_non_positive_amounts_rejected_without_db() {
        // Validation happens before any query, so a disconnected pool is fine
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgresql://localhost/unused")
            .expect("lazy pool");
        let wallets = service(pool);
        let user_id = Uuid::new_v4();

        assert!(matches!(
            wallets.deposit(user_id, 0).await,
            Err(WalletError::InvalidAmount)
        ));
        assert!(matches!(
            wallets.withdraw(user_id, -5, "test").await,
            Err(WalletError::InvalidAmount)
        ));
        assert!(matches!(
            wallets.hold(user_id, 0, "escrow", None).await,
            Err(WalletError::InvalidAmount)
        ));
    }
}
