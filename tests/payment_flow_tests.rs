//! Payment intent flow tests (simulated provider)
//!
//! With no STRIPE_SECRET_KEY configured the client issues simulated
//! intents, which lets the whole pending -> succeeded -> refunded flow run
//! against a real database without touching the provider.

#[cfg(test)]
mod tests {
    use sqlx::PgPool;
    use uuid::Uuid;

    use gigscape_server::transaction::{
        StripeClient, TransactionError, TransactionService, TransactionStatus,
    };
    use gigscape_server::wallet::WalletService;

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

    async fn seed_user_with_wallet(pool: &PgPool) -> Uuid {
        let user_id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, role)
            VALUES ($1, 'Payment Tester', $2, '$2b$12$test', 'client')
            "#,
        )
        .bind(user_id)
        .bind(format!("payment-{}@test.example", user_id))
        .execute(pool)
        .await
        .expect("Failed to seed user");

        WalletService::new(pool.clone(), "inr".to_string())
            .create_wallet(user_id)
            .await
            .expect("Failed to create wallet");

        user_id
    }

    fn service(pool: PgPool) -> TransactionService {
        let stripe = StripeClient::new(None, "https://api.stripe.com".to_string());
        TransactionService::new(pool, stripe, "inr".to_string())
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_intent_starts_pending_with_no_balance_effect() {
        let pool = setup_test_db().await;
        let user_id = seed_user_with_wallet(&pool).await;
        let transactions = service(pool.clone());

        let (client_secret, transaction) = transactions
            .create_stripe_payment_intent(user_id, 20_000, None, None)
            .await
            .unwrap();

        assert!(!client_secret.is_empty());
        assert_eq!(transaction.status, TransactionStatus::Pending);

        let snapshot = WalletService::new(pool.clone(), "inr".to_string())
            .get_wallet(user_id)
            .await
            .unwrap();
        assert_eq!(snapshot.wallet.balance, 0);
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_confirm_credits_wallet_once() {
        let pool = setup_test_db().await;
        let user_id = seed_user_with_wallet(&pool).await;
        let transactions = service(pool.clone());

        let (_, transaction) = transactions
            .create_stripe_payment_intent(user_id, 20_000, None, None)
            .await
            .unwrap();

        let intent_id = transaction.provider_payment_id.clone().unwrap();

        let confirmed = transactions.confirm_stripe_payment(&intent_id).await.unwrap();
        assert_eq!(confirmed.status, TransactionStatus::Succeeded);

        let snapshot = WalletService::new(pool.clone(), "inr".to_string())
            .get_wallet(user_id)
            .await
            .unwrap();
        assert_eq!(snapshot.wallet.balance, 20_000);

        // Confirming a settled intent is an invalid transition, not a
        // second credit
        let result = transactions.confirm_stripe_payment(&intent_id).await;
        assert!(matches!(
            result,
            Err(TransactionError::InvalidTransition { .. })
        ));

        let snapshot = WalletService::new(pool.clone(), "inr".to_string())
            .get_wallet(user_id)
            .await
            .unwrap();
        assert_eq!(snapshot.wallet.balance, 20_000);
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_refund_reverses_the_credit() {
        let pool = setup_test_db().await;
        let user_id = seed_user_with_wallet(&pool).await;
        let transactions = service(pool.clone());

        let (_, transaction) = transactions
            .create_stripe_payment_intent(user_id, 20_000, None, None)
            .await
            .unwrap();

        let intent_id = transaction.provider_payment_id.clone().unwrap();
        transactions.confirm_stripe_payment(&intent_id).await.unwrap();

        let refunded = transactions
            .refund_stripe_payment(transaction.id)
            .await
            .unwrap();
        assert_eq!(refunded.status, TransactionStatus::Refunded);

        let snapshot = WalletService::new(pool.clone(), "inr".to_string())
            .get_wallet(user_id)
            .await
            .unwrap();
        assert_eq!(snapshot.wallet.balance, 0);

        // A second refund finds no refundable row
        let result = transactions.refund_stripe_payment(transaction.id).await;
        assert!(matches!(
            result,
            Err(TransactionError::InvalidTransition { .. })
        ));
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_refund_requires_succeeded_status() {
        let pool = setup_test_db().await;
        let user_id = seed_user_with_wallet(&pool).await;
        let transactions = service(pool.clone());

        let (_, transaction) = transactions
            .create_stripe_payment_intent(user_id, 20_000, None, None)
            .await
            .unwrap();

        // Still pending: the status graph has no pending -> refunded edge
        let result = transactions.refund_stripe_payment(transaction.id).await;
        assert!(matches!(
            result,
            Err(TransactionError::InvalidTransition { .. })
        ));
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_admin_override_respects_the_graph() {
        let pool = setup_test_db().await;
        let user_id = seed_user_with_wallet(&pool).await;
        let transactions = service(pool.clone());

        let (_, transaction) = transactions
            .create_stripe_payment_intent(user_id, 20_000, None, None)
            .await
            .unwrap();

        // pending -> failed is allowed
        let failed = transactions
            .update_status(transaction.id, TransactionStatus::Failed)
            .await
            .unwrap();
        assert_eq!(failed.status, TransactionStatus::Failed);

        // failed is terminal
        let result = transactions
            .update_status(transaction.id, TransactionStatus::Succeeded)
            .await;
        assert!(matches!(
            result,
            Err(TransactionError::InvalidTransition { .. })
        ));
    }
}
