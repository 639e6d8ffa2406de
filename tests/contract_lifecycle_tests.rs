//! Contract lifecycle and milestone aggregation tests

#[cfg(test)]
mod tests {
    use sqlx::PgPool;
    use uuid::Uuid;

    use gigscape_server::contract::{reconcile_completion, ContractService, ContractStatus};
    use gigscape_server::milestone::{
        CreateMilestoneRequest, MilestoneError, MilestoneService, MilestoneStatus,
    };
    use gigscape_server::review::{CreateReviewRequest, ReviewError, ReviewService};

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

    /// Seed a client, freelancer, job, accepted proposal, and contract
    async fn seed_contract(pool: &PgPool) -> (Uuid, Uuid, Uuid) {
        let client_id = seed_user(pool, "client").await;
        let freelancer_id = seed_user(pool, "freelancer").await;

        let job_id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO jobs (id, client_id, title, description, currency, status)
            VALUES ($1, $2, 'Build a website', 'Full build', 'inr', 'open')
            "#,
        )
        .bind(job_id)
        .bind(client_id)
        .execute(pool)
        .await
        .expect("Failed to seed job");

        let proposal_id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO proposals (id, job_id, freelancer_id, cover_letter, bid_amount, currency, status)
            VALUES ($1, $2, $3, 'I can do this', 50000, 'inr', 'accepted')
            "#,
        )
        .bind(proposal_id)
        .bind(job_id)
        .bind(freelancer_id)
        .execute(pool)
        .await
        .expect("Failed to seed proposal");

        let contract = ContractService::new(pool.clone())
            .create_contract(client_id, proposal_id, None, None)
            .await
            .expect("Failed to create contract");

        (contract.id, client_id, freelancer_id)
    }

    async fn seed_user(pool: &PgPool, role: &str) -> Uuid {
        let user_id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, role)
            VALUES ($1, 'Lifecycle Tester', $2, '$2b$12$test', $3::user_role)
            "#,
        )
        .bind(user_id)
        .bind(format!("lifecycle-{}@test.example", user_id))
        .bind(role)
        .execute(pool)
        .await
        .expect("Failed to seed user");
        user_id
    }

    async fn seed_milestone(
        milestones: &MilestoneService,
        user_id: Uuid,
        contract_id: Uuid,
        title: &str,
    ) -> Uuid {
        milestones
            .create_milestone(
                user_id,
                CreateMilestoneRequest {
                    contract_id,
                    title: title.to_string(),
                    description: "Deliverable".to_string(),
                    due_date: None,
                    amount: 25_000,
                    currency: None,
                },
            )
            .await
            .expect("Failed to create milestone")
            .id
    }

    /// Walk a milestone through pending -> in_progress -> completed
    async fn complete_milestone(milestones: &MilestoneService, user_id: Uuid, id: Uuid) -> bool {
        milestones
            .update_status(user_id, id, MilestoneStatus::InProgress)
            .await
            .expect("pending -> in_progress");
        let (_, contract_completed) = milestones
            .update_status(user_id, id, MilestoneStatus::Completed)
            .await
            .expect("in_progress -> completed");
        contract_completed
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_contract_completes_only_when_all_milestones_do() {
        let pool = setup_test_db().await;
        let (contract_id, client_id, freelancer_id) = seed_contract(&pool).await;

        let contracts = ContractService::new(pool.clone());
        let milestones = MilestoneService::new(pool.clone(), "inr".to_string());

        let m1 = seed_milestone(&milestones, client_id, contract_id, "Design").await;
        let m2 = seed_milestone(&milestones, client_id, contract_id, "Implementation").await;

        // First milestone completing must not complete the contract
        let completed = complete_milestone(&milestones, freelancer_id, m1).await;
        assert!(!completed);

        let contract = contracts.get_contract(contract_id).await.unwrap().unwrap();
        assert_ne!(contract.status, ContractStatus::Completed);

        // The last milestone completing must complete the contract
        let completed = complete_milestone(&milestones, freelancer_id, m2).await;
        assert!(completed);

        let contract = contracts.get_contract(contract_id).await.unwrap().unwrap();
        assert_eq!(contract.status, ContractStatus::Completed);
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_reconciliation_is_idempotent() {
        let pool = setup_test_db().await;
        let (contract_id, client_id, freelancer_id) = seed_contract(&pool).await;

        let milestones = MilestoneService::new(pool.clone(), "inr".to_string());
        let m1 = seed_milestone(&milestones, client_id, contract_id, "Only one").await;
        complete_milestone(&milestones, freelancer_id, m1).await;

        // Re-running on the unchanged milestone set writes nothing
        let mut db_tx = pool.begin().await.unwrap();
        let changed = reconcile_completion(&mut db_tx, contract_id).await.unwrap();
        db_tx.commit().await.unwrap();
        assert!(!changed);

        let contract = ContractService::new(pool.clone())
            .get_contract(contract_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(contract.status, ContractStatus::Completed);
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_contract_without_milestones_never_auto_completes() {
        let pool = setup_test_db().await;
        let (contract_id, _, _) = seed_contract(&pool).await;

        let mut db_tx = pool.begin().await.unwrap();
        let changed = reconcile_completion(&mut db_tx, contract_id).await.unwrap();
        db_tx.commit().await.unwrap();

        assert!(!changed);

        let contract = ContractService::new(pool.clone())
            .get_contract(contract_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(contract.status, ContractStatus::Pending);
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_milestone_state_machine_is_enforced() {
        let pool = setup_test_db().await;
        let (contract_id, client_id, freelancer_id) = seed_contract(&pool).await;

        let milestones = MilestoneService::new(pool.clone(), "inr".to_string());
        let m1 = seed_milestone(&milestones, client_id, contract_id, "Design").await;

        // Skipping pending -> completed is rejected
        let result = milestones
            .update_status(freelancer_id, m1, MilestoneStatus::Completed)
            .await;
        assert!(matches!(
            result,
            Err(MilestoneError::InvalidTransition { .. })
        ));

        // Reversal after moving forward is rejected
        milestones
            .update_status(freelancer_id, m1, MilestoneStatus::InProgress)
            .await
            .unwrap();
        let result = milestones
            .update_status(freelancer_id, m1, MilestoneStatus::Pending)
            .await;
        assert!(matches!(
            result,
            Err(MilestoneError::InvalidTransition { .. })
        ));
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_completed_milestone_cannot_be_deleted() {
        let pool = setup_test_db().await;
        let (contract_id, client_id, freelancer_id) = seed_contract(&pool).await;

        let milestones = MilestoneService::new(pool.clone(), "inr".to_string());
        let m1 = seed_milestone(&milestones, client_id, contract_id, "Design").await;
        complete_milestone(&milestones, freelancer_id, m1).await;

        let result = milestones.delete_milestone(client_id, m1).await;
        assert!(matches!(result, Err(MilestoneError::CompletedImmutable)));
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_milestone_round_trip() {
        let pool = setup_test_db().await;
        let (contract_id, client_id, _) = seed_contract(&pool).await;

        let milestones = MilestoneService::new(pool.clone(), "inr".to_string());

        let created = milestones
            .create_milestone(
                client_id,
                CreateMilestoneRequest {
                    contract_id,
                    title: "Design".to_string(),
                    description: "Wireframes and mockups".to_string(),
                    due_date: None,
                    amount: 12_500,
                    currency: Some("inr".to_string()),
                },
            )
            .await
            .unwrap();

        let fetched = milestones.get_by_id(created.id).await.unwrap();
        assert_eq!(fetched.milestone.title, "Design");
        assert_eq!(fetched.milestone.amount, 12_500);
        assert_eq!(fetched.milestone.currency, "inr");
        assert_eq!(fetched.milestone.due_date, created.due_date);
        assert_eq!(fetched.milestone.status, MilestoneStatus::Pending);
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_one_review_per_contract_and_reviewer() {
        let pool = setup_test_db().await;
        let (contract_id, client_id, freelancer_id) = seed_contract(&pool).await;

        let milestones = MilestoneService::new(pool.clone(), "inr".to_string());
        let m1 = seed_milestone(&milestones, client_id, contract_id, "Everything").await;
        complete_milestone(&milestones, freelancer_id, m1).await;

        let reviews = ReviewService::new(pool.clone());

        let request = || CreateReviewRequest {
            contract_id,
            rating: 5,
            title: Some("Excellent".to_string()),
            comment: None,
        };

        let review = reviews.create_review(client_id, request()).await.unwrap();
        assert_eq!(review.reviewee_id, freelancer_id);

        let result = reviews.create_review(client_id, request()).await;
        assert!(matches!(result, Err(ReviewError::AlreadyReviewed)));

        // The other party still gets their own review
        let counterpart = reviews.create_review(freelancer_id, request()).await.unwrap();
        assert_eq!(counterpart.reviewee_id, client_id);
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_review_requires_completed_contract() {
        let pool = setup_test_db().await;
        let (contract_id, client_id, _) = seed_contract(&pool).await;

        let reviews = ReviewService::new(pool.clone());

        let result = reviews
            .create_review(
                client_id,
                CreateReviewRequest {
                    contract_id,
                    rating: 4,
                    title: None,
                    comment: None,
                },
            )
            .await;

        assert!(matches!(result, Err(ReviewError::ContractNotCompleted)));
    }
}
