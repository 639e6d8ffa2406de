//! Milestone service layer - CRUD and the status state machine
//!
//! Completing a milestone runs the contract reconciliation inside the same
//! database transaction, so the contract can never observe a half-applied
//! milestone set.

use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::contract::{reconcile_completion, Contract};
use crate::milestone::{
    CreateMilestoneRequest, Milestone, MilestoneAttachment, MilestoneStatus,
    MilestoneWithAttachments, UpdateMilestoneRequest,
};
use crate::notification;

/// Milestone service errors
#[derive(Error, Debug)]
pub enum MilestoneError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Milestone not found")]
    NotFound,

    #[error("Contract not found")]
    ContractNotFound,

    #[error("Contract is no longer active")]
    ContractClosed,

    #[error("Only the contract's client or freelancer may do this")]
    NotContractParty,

    #[error("Amount must be greater than zero")]
    InvalidAmount,

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Completed milestones cannot be deleted")]
    CompletedImmutable,
}

impl From<sqlx::Error> for MilestoneError {
    fn from(e: sqlx::Error) -> Self {
        MilestoneError::DatabaseError(e.to_string())
    }
}

/// Milestone service for managing milestone lifecycle
#[derive(Clone)]
pub struct MilestoneService {
    db_pool: PgPool,
    default_currency: String,
}

impl MilestoneService {
    pub fn new(db_pool: PgPool, default_currency: String) -> Self {
        Self {
            db_pool,
            default_currency,
        }
    }

    /// Create a milestone under a contract
    pub async fn create_milestone(
        &self,
        user_id: Uuid,
        request: CreateMilestoneRequest,
    ) -> Result<Milestone, MilestoneError> {
        if request.amount <= 0 {
            return Err(MilestoneError::InvalidAmount);
        }

        let contract = self.fetch_contract(request.contract_id).await?;

        if !contract.is_party(user_id) {
            return Err(MilestoneError::NotContractParty);
        }

        if contract.status.is_terminal() {
            return Err(MilestoneError::ContractClosed);
        }

        let currency = request
            .currency
            .unwrap_or_else(|| self.default_currency.clone());

        let milestone = sqlx::query_as::<_, Milestone>(
            r#"
            INSERT INTO milestones (id, contract_id, title, description, due_date, amount, currency, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending')
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.contract_id)
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.due_date)
        .bind(request.amount)
        .bind(&currency)
        .fetch_one(&self.db_pool)
        .await?;

        tracing::info!(
            milestone_id = %milestone.id,
            contract_id = %contract.id,
            "Milestone created"
        );

        Ok(milestone)
    }

    /// Move a milestone along its state machine
    ///
    /// Returns the updated milestone and whether the owning contract was
    /// promoted to completed by this transition.
    pub async fn update_status(
        &self,
        user_id: Uuid,
        milestone_id: Uuid,
        new_status: MilestoneStatus,
    ) -> Result<(Milestone, bool), MilestoneError> {
        let milestone = self.fetch_milestone(milestone_id).await?;
        let contract = self.fetch_contract(milestone.contract_id).await?;

        if !contract.is_party(user_id) {
            return Err(MilestoneError::NotContractParty);
        }

        if !milestone.status.can_transition(new_status) {
            return Err(MilestoneError::InvalidTransition {
                from: milestone.status.as_str().to_string(),
                to: new_status.as_str().to_string(),
            });
        }

        let mut db_tx = self.db_pool.begin().await?;

        // Guard on the old status so concurrent transitions cannot race
        let updated = sqlx::query_as::<_, Milestone>(
            r#"
            UPDATE milestones
            SET status = $1, updated_at = NOW()
            WHERE id = $2 AND status = $3
            RETURNING *
            "#,
        )
        .bind(new_status)
        .bind(milestone_id)
        .bind(milestone.status)
        .fetch_optional(&mut *db_tx)
        .await?
        .ok_or(MilestoneError::InvalidTransition {
            from: milestone.status.as_str().to_string(),
            to: new_status.as_str().to_string(),
        })?;

        let mut contract_completed = false;

        if new_status == MilestoneStatus::Completed {
            contract_completed = reconcile_completion(&mut db_tx, contract.id).await?;
        }

        // Tell the other party what moved
        if let Some(counterparty) = contract.counterparty(user_id) {
            notification::insert_in_tx(
                &mut db_tx,
                counterparty,
                "milestone_status",
                &format!("Milestone \"{}\" is now {}", updated.title, new_status.as_str()),
                None,
                Some(&format!("/contracts/{}", contract.id)),
            )
            .await?;
        }

        db_tx.commit().await?;

        tracing::info!(
            milestone_id = %milestone_id,
            status = new_status.as_str(),
            contract_completed,
            "Milestone status updated"
        );

        Ok((updated, contract_completed))
    }

    /// Amend milestone fields while it is not terminal
    pub async fn update_milestone(
        &self,
        user_id: Uuid,
        milestone_id: Uuid,
        request: UpdateMilestoneRequest,
    ) -> Result<Milestone, MilestoneError> {
        if matches!(request.amount, Some(a) if a <= 0) {
            return Err(MilestoneError::InvalidAmount);
        }

        let milestone = self.fetch_milestone(milestone_id).await?;
        let contract = self.fetch_contract(milestone.contract_id).await?;

        if !contract.is_party(user_id) {
            return Err(MilestoneError::NotContractParty);
        }

        if milestone.status.is_terminal() {
            return Err(MilestoneError::CompletedImmutable);
        }

        let updated = sqlx::query_as::<_, Milestone>(
            r#"
            UPDATE milestones
            SET title = COALESCE($1, title),
                description = COALESCE($2, description),
                due_date = COALESCE($3, due_date),
                amount = COALESCE($4, amount),
                currency = COALESCE($5, currency),
                updated_at = NOW()
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.due_date)
        .bind(request.amount)
        .bind(&request.currency)
        .bind(milestone_id)
        .fetch_optional(&self.db_pool)
        .await?;

        updated.ok_or(MilestoneError::NotFound)
    }

    /// Attach a file reference; status is unchanged
    pub async fn attach_file(
        &self,
        user_id: Uuid,
        milestone_id: Uuid,
        url: &str,
        public_id: Option<String>,
        mime_type: Option<String>,
    ) -> Result<MilestoneAttachment, MilestoneError> {
        let milestone = self.fetch_milestone(milestone_id).await?;
        let contract = self.fetch_contract(milestone.contract_id).await?;

        if !contract.is_party(user_id) {
            return Err(MilestoneError::NotContractParty);
        }

        let attachment = sqlx::query_as::<_, MilestoneAttachment>(
            r#"
            INSERT INTO milestone_attachments (id, milestone_id, url, public_id, mime_type)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(milestone_id)
        .bind(url)
        .bind(&public_id)
        .bind(&mime_type)
        .fetch_one(&self.db_pool)
        .await?;

        Ok(attachment)
    }

    /// Milestones of a contract, oldest first (party-only)
    pub async fn get_by_contract(
        &self,
        user_id: Uuid,
        contract_id: Uuid,
    ) -> Result<Vec<Milestone>, MilestoneError> {
        let contract = self.fetch_contract(contract_id).await?;

        if !contract.is_party(user_id) {
            return Err(MilestoneError::NotContractParty);
        }

        let milestones = sqlx::query_as::<_, Milestone>(
            "SELECT * FROM milestones WHERE contract_id = $1 ORDER BY created_at",
        )
        .bind(contract_id)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(milestones)
    }

    /// Get a milestone with its attachments
    pub async fn get_by_id(
        &self,
        milestone_id: Uuid,
    ) -> Result<MilestoneWithAttachments, MilestoneError> {
        let milestone = self.fetch_milestone(milestone_id).await?;

        let attachments = sqlx::query_as::<_, MilestoneAttachment>(
            "SELECT * FROM milestone_attachments WHERE milestone_id = $1 ORDER BY created_at",
        )
        .bind(milestone_id)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(MilestoneWithAttachments {
            milestone,
            attachments,
        })
    }

    /// Delete a milestone; completed ones are immutable
    pub async fn delete_milestone(
        &self,
        user_id: Uuid,
        milestone_id: Uuid,
    ) -> Result<(), MilestoneError> {
        let milestone = self.fetch_milestone(milestone_id).await?;
        let contract = self.fetch_contract(milestone.contract_id).await?;

        if !contract.is_party(user_id) {
            return Err(MilestoneError::NotContractParty);
        }

        if milestone.status == MilestoneStatus::Completed {
            return Err(MilestoneError::CompletedImmutable);
        }

        sqlx::query("DELETE FROM milestones WHERE id = $1")
            .bind(milestone_id)
            .execute(&self.db_pool)
            .await?;

        tracing::info!(milestone_id = %milestone_id, "Milestone deleted");

        Ok(())
    }

    /// All milestones, newest first (admin dashboard)
    pub async fn admin_list(&self) -> Result<Vec<Milestone>, MilestoneError> {
        let milestones =
            sqlx::query_as::<_, Milestone>("SELECT * FROM milestones ORDER BY created_at DESC")
                .fetch_all(&self.db_pool)
                .await?;

        Ok(milestones)
    }

    /// Notify contract parties about milestones past their due date
    ///
    /// Each overdue milestone produces at most one notification per party;
    /// the NOT EXISTS guard makes repeat sweeps write-free.
    pub async fn detect_overdue(&self) -> Result<u64, MilestoneError> {
        let rows_affected = sqlx::query(
            r#"
            INSERT INTO notifications (id, user_id, kind, title, body, link, is_read)
            SELECT gen_random_uuid(), party.user_id, 'milestone_overdue',
                   'Milestone "' || m.title || '" is overdue',
                   NULL, '/milestones/' || m.id::TEXT, FALSE
            FROM milestones m
            JOIN contracts c ON c.id = m.contract_id
            CROSS JOIN LATERAL (VALUES (c.client_id), (c.freelancer_id)) AS party(user_id)
            WHERE m.due_date IS NOT NULL
              AND m.due_date < NOW()
              AND m.status IN ('pending', 'in_progress')
              AND NOT EXISTS (
                  SELECT 1 FROM notifications n
                  WHERE n.user_id = party.user_id
                    AND n.kind = 'milestone_overdue'
                    AND n.link = '/milestones/' || m.id::TEXT)
            "#,
        )
        .execute(&self.db_pool)
        .await?
        .rows_affected();

        Ok(rows_affected)
    }

    async fn fetch_milestone(&self, id: Uuid) -> Result<Milestone, MilestoneError> {
        sqlx::query_as::<_, Milestone>("SELECT * FROM milestones WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or(MilestoneError::NotFound)
    }

    async fn fetch_contract(&self, id: Uuid) -> Result<Contract, MilestoneError> {
        sqlx::query_as::<_, Contract>("SELECT * FROM contracts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or(MilestoneError::ContractNotFound)
    }
}

/// Background task flagging overdue milestones every ten minutes
pub async fn overdue_detector(service: MilestoneService) {
    let mut interval = tokio::time::interval(std::time::Duration::from_secs(600));

    loop {
        interval.tick().await;

        match service.detect_overdue().await {
            Ok(0) => {}
            Ok(n) => tracing::info!("Flagged {} overdue milestone notifications", n),
            Err(e) => tracing::error!("Overdue milestone sweep failed: {}", e),
        }
    }
}
