//! Contract service layer - lifecycle and completion reconciliation

use sqlx::types::chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

use crate::contract::{
    Contract, ContractStats, ContractStatus, ContractWithMilestones, EscrowStatus,
    UpdateContractRequest,
};
use crate::milestone::Milestone;
use crate::proposal::ProposalStatus;

/// Contract service errors
#[derive(Error, Debug)]
pub enum ContractError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Contract not found")]
    NotFound,

    #[error("Proposal not found")]
    ProposalNotFound,

    #[error("Proposal has not been accepted")]
    ProposalNotAccepted,

    #[error("Only the job's client can create this contract")]
    NotJobClient,

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },
}

impl From<sqlx::Error> for ContractError {
    fn from(e: sqlx::Error) -> Self {
        ContractError::DatabaseError(e.to_string())
    }
}

/// Row shape used when deriving a contract from a proposal
#[derive(sqlx::FromRow)]
struct AcceptedProposal {
    id: Uuid,
    job_id: Uuid,
    freelancer_id: Uuid,
    bid_amount: i64,
    currency: String,
    status: ProposalStatus,
    job_client_id: Uuid,
}

/// Promote a contract to `completed` when every milestone is completed
///
/// Runs inside the caller's open database transaction (the milestone
/// status-update path), so milestone state and contract state move
/// together. The guarded UPDATE makes the operation idempotent: a second
/// run on an unchanged milestone set matches no row and writes nothing.
/// Contracts without milestones are never auto-completed.
pub async fn reconcile_completion(
    db_tx: &mut sqlx::Transaction<'_, Postgres>,
    contract_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let rows_affected = sqlx::query(
        r#"
        UPDATE contracts c
        SET status = 'completed', updated_at = NOW()
        WHERE c.id = $1
          AND c.status NOT IN ('completed', 'cancelled')
          AND EXISTS (
              SELECT 1 FROM milestones m WHERE m.contract_id = c.id)
          AND NOT EXISTS (
              SELECT 1 FROM milestones m
              WHERE m.contract_id = c.id AND m.status <> 'completed')
        "#,
    )
    .bind(contract_id)
    .execute(&mut **db_tx)
    .await?
    .rows_affected();

    if rows_affected > 0 {
        tracing::info!(contract_id = %contract_id, "All milestones completed; contract completed");
    }

    Ok(rows_affected > 0)
}

/// Contract service for managing the contract lifecycle
#[derive(Clone)]
pub struct ContractService {
    db_pool: PgPool,
}

impl ContractService {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// Create a contract from an accepted proposal
    ///
    /// Job, freelancer, amount and currency all derive from the proposal;
    /// the caller must be the job's client.
    pub async fn create_contract(
        &self,
        client_id: Uuid,
        proposal_id: Uuid,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
    ) -> Result<Contract, ContractError> {
        let proposal = sqlx::query_as::<_, AcceptedProposal>(
            r#"
            SELECT p.id, p.job_id, p.freelancer_id, p.bid_amount, p.currency, p.status,
                   j.client_id AS job_client_id
            FROM proposals p
            JOIN jobs j ON j.id = p.job_id
            WHERE p.id = $1
            "#,
        )
        .bind(proposal_id)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or(ContractError::ProposalNotFound)?;

        if proposal.status != ProposalStatus::Accepted {
            return Err(ContractError::ProposalNotAccepted);
        }

        if proposal.job_client_id != client_id {
            return Err(ContractError::NotJobClient);
        }

        let contract = sqlx::query_as::<_, Contract>(
            r#"
            INSERT INTO contracts (
                id, job_id, proposal_id, client_id, freelancer_id,
                total_amount, currency, start_date, end_date, status, escrow_status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'pending', 'not_required')
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(proposal.job_id)
        .bind(proposal.id)
        .bind(client_id)
        .bind(proposal.freelancer_id)
        .bind(proposal.bid_amount)
        .bind(&proposal.currency)
        .bind(start_date)
        .bind(end_date)
        .fetch_one(&self.db_pool)
        .await?;

        tracing::info!(contract_id = %contract.id, proposal_id = %proposal_id, "Contract created");

        Ok(contract)
    }

    /// Get a single contract by ID
    pub async fn get_contract(&self, id: Uuid) -> Result<Option<Contract>, ContractError> {
        let contract = sqlx::query_as::<_, Contract>("SELECT * FROM contracts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?;

        Ok(contract)
    }

    /// Contracts where the user is client or freelancer, milestones embedded
    pub async fn get_my_contracts(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<ContractWithMilestones>, ContractError> {
        let contracts = sqlx::query_as::<_, Contract>(
            r#"
            SELECT * FROM contracts
            WHERE client_id = $1 OR freelancer_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db_pool)
        .await?;

        if contracts.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = contracts.iter().map(|c| c.id).collect();

        let milestones = sqlx::query_as::<_, Milestone>(
            "SELECT * FROM milestones WHERE contract_id = ANY($1) ORDER BY created_at",
        )
        .bind(&ids)
        .fetch_all(&self.db_pool)
        .await?;

        let mut by_contract: HashMap<Uuid, Vec<Milestone>> = HashMap::new();
        for milestone in milestones {
            by_contract
                .entry(milestone.contract_id)
                .or_default()
                .push(milestone);
        }

        Ok(contracts
            .into_iter()
            .map(|contract| {
                let milestones = by_contract.remove(&contract.id).unwrap_or_default();
                ContractWithMilestones {
                    contract,
                    milestones,
                }
            })
            .collect())
    }

    /// Amend contract terms
    pub async fn update_contract(
        &self,
        id: Uuid,
        request: UpdateContractRequest,
    ) -> Result<Contract, ContractError> {
        let contract = sqlx::query_as::<_, Contract>(
            r#"
            UPDATE contracts
            SET total_amount = COALESCE($1, total_amount),
                currency = COALESCE($2, currency),
                start_date = COALESCE($3, start_date),
                end_date = COALESCE($4, end_date),
                updated_at = NOW()
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(request.total_amount)
        .bind(&request.currency)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await?;

        contract.ok_or(ContractError::NotFound)
    }

    /// Move the contract status along the lifecycle graph
    pub async fn update_status(
        &self,
        id: Uuid,
        new_status: ContractStatus,
    ) -> Result<Contract, ContractError> {
        let current = self.get_contract(id).await?.ok_or(ContractError::NotFound)?;

        if !current.status.can_transition(new_status) {
            return Err(ContractError::InvalidTransition {
                from: current.status.as_str().to_string(),
                to: new_status.as_str().to_string(),
            });
        }

        // Guard on the old status so concurrent transitions cannot race
        let updated = sqlx::query_as::<_, Contract>(
            r#"
            UPDATE contracts
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
        .ok_or(ContractError::InvalidTransition {
            from: current.status.as_str().to_string(),
            to: new_status.as_str().to_string(),
        })?;

        Ok(updated)
    }

    /// Move the escrow state
    pub async fn update_escrow_status(
        &self,
        id: Uuid,
        escrow_status: EscrowStatus,
    ) -> Result<Contract, ContractError> {
        let contract = sqlx::query_as::<_, Contract>(
            r#"
            UPDATE contracts
            SET escrow_status = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING *
            "#,
        )
        .bind(escrow_status)
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await?;

        contract.ok_or(ContractError::NotFound)
    }

    /// Hard-delete a contract (admin only; exposed for cleanup)
    pub async fn delete_contract(&self, id: Uuid) -> Result<(), ContractError> {
        let rows_affected = sqlx::query("DELETE FROM contracts WHERE id = $1")
            .bind(id)
            .execute(&self.db_pool)
            .await?
            .rows_affected();

        if rows_affected == 0 {
            return Err(ContractError::NotFound);
        }

        Ok(())
    }

    /// Per-status aggregates for the admin dashboard
    pub async fn admin_stats(&self) -> Result<Vec<ContractStats>, ContractError> {
        let stats = sqlx::query_as::<_, ContractStats>(
            r#"
            SELECT status, COUNT(*) AS count, COALESCE(SUM(total_amount), 0)::BIGINT AS total_amount
            FROM contracts
            GROUP BY status
            ORDER BY status
            "#,
        )
        .fetch_all(&self.db_pool)
        .await?;

        Ok(stats)
    }
}
