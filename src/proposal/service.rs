//! Proposal service layer

use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::job::JobStatus;
use crate::notification;
use crate::proposal::{Proposal, ProposalStatus, SubmitProposalRequest};

/// Proposal service errors
#[derive(Error, Debug)]
pub enum ProposalError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Proposal not found")]
    NotFound,

    #[error("Job not found")]
    JobNotFound,

    #[error("Job is not open for proposals")]
    JobNotOpen,

    #[error("Only the proposal's freelancer may do this")]
    NotOwner,

    #[error("Only the job's client may do this")]
    NotJobClient,

    #[error("Only a pending proposal can be {0}")]
    NotPending(&'static str),

    #[error("Accepted proposals cannot be deleted")]
    AcceptedImmutable,

    #[error("Amount must be greater than zero")]
    InvalidAmount,
}

impl From<sqlx::Error> for ProposalError {
    fn from(e: sqlx::Error) -> Self {
        ProposalError::DatabaseError(e.to_string())
    }
}

/// Proposal service
#[derive(Clone)]
pub struct ProposalService {
    db_pool: PgPool,
    default_currency: String,
}

impl ProposalService {
    pub fn new(db_pool: PgPool, default_currency: String) -> Self {
        Self {
            db_pool,
            default_currency,
        }
    }

    /// Submit a proposal against an open job
    pub async fn submit(
        &self,
        freelancer_id: Uuid,
        request: SubmitProposalRequest,
    ) -> Result<Proposal, ProposalError> {
        if request.bid_amount <= 0 {
            return Err(ProposalError::InvalidAmount);
        }

        let job_status: Option<(JobStatus,)> =
            sqlx::query_as("SELECT status FROM jobs WHERE id = $1")
                .bind(request.job_id)
                .fetch_optional(&self.db_pool)
                .await?;

        match job_status {
            None => return Err(ProposalError::JobNotFound),
            Some((status,)) if status != JobStatus::Open => return Err(ProposalError::JobNotOpen),
            Some(_) => {}
        }

        let currency = request
            .currency
            .unwrap_or_else(|| self.default_currency.clone());

        let proposal = sqlx::query_as::<_, Proposal>(
            r#"
            INSERT INTO proposals (
                id, job_id, freelancer_id, cover_letter, bid_amount,
                currency, estimated_hours, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending')
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.job_id)
        .bind(freelancer_id)
        .bind(&request.cover_letter)
        .bind(request.bid_amount)
        .bind(&currency)
        .bind(request.estimated_hours)
        .fetch_one(&self.db_pool)
        .await?;

        tracing::info!(proposal_id = %proposal.id, job_id = %request.job_id, "Proposal submitted");

        Ok(proposal)
    }

    /// Withdraw an own pending proposal
    pub async fn withdraw(
        &self,
        freelancer_id: Uuid,
        proposal_id: Uuid,
    ) -> Result<Proposal, ProposalError> {
        let proposal = self.fetch(proposal_id).await?;

        if proposal.freelancer_id != freelancer_id {
            return Err(ProposalError::NotOwner);
        }

        if proposal.status != ProposalStatus::Pending {
            return Err(ProposalError::NotPending("withdrawn"));
        }

        let updated = sqlx::query_as::<_, Proposal>(
            r#"
            UPDATE proposals
            SET status = 'withdrawn', updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(proposal_id)
        .fetch_optional(&self.db_pool)
        .await?;

        updated.ok_or(ProposalError::NotPending("withdrawn"))
    }

    /// A freelancer's own proposals, newest first
    pub async fn get_mine(&self, freelancer_id: Uuid) -> Result<Vec<Proposal>, ProposalError> {
        let proposals = sqlx::query_as::<_, Proposal>(
            "SELECT * FROM proposals WHERE freelancer_id = $1 ORDER BY created_at DESC",
        )
        .bind(freelancer_id)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(proposals)
    }

    /// Proposals on a job, restricted to the job's client
    pub async fn get_job_proposals(
        &self,
        client_id: Uuid,
        job_id: Uuid,
    ) -> Result<Vec<Proposal>, ProposalError> {
        let owner: Option<(Uuid,)> = sqlx::query_as("SELECT client_id FROM jobs WHERE id = $1")
            .bind(job_id)
            .fetch_optional(&self.db_pool)
            .await?;

        match owner {
            None => return Err(ProposalError::JobNotFound),
            Some((owner_id,)) if owner_id != client_id => return Err(ProposalError::NotJobClient),
            Some(_) => {}
        }

        let proposals = sqlx::query_as::<_, Proposal>(
            "SELECT * FROM proposals WHERE job_id = $1 ORDER BY created_at DESC",
        )
        .bind(job_id)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(proposals)
    }

    /// Get a single proposal
    pub async fn get_by_id(&self, proposal_id: Uuid) -> Result<Proposal, ProposalError> {
        self.fetch(proposal_id).await
    }

    /// Client decision: accept or reject a pending proposal
    ///
    /// Notifies the freelancer in the same database transaction.
    pub async fn update_status(
        &self,
        client_id: Uuid,
        proposal_id: Uuid,
        new_status: ProposalStatus,
    ) -> Result<Proposal, ProposalError> {
        if !matches!(
            new_status,
            ProposalStatus::Accepted | ProposalStatus::Rejected
        ) {
            return Err(ProposalError::NotPending("decided"));
        }

        let proposal = self.fetch(proposal_id).await?;

        let owner: Option<(Uuid,)> = sqlx::query_as("SELECT client_id FROM jobs WHERE id = $1")
            .bind(proposal.job_id)
            .fetch_optional(&self.db_pool)
            .await?;

        match owner {
            None => return Err(ProposalError::JobNotFound),
            Some((owner_id,)) if owner_id != client_id => return Err(ProposalError::NotJobClient),
            Some(_) => {}
        }

        if proposal.status != ProposalStatus::Pending {
            return Err(ProposalError::NotPending("decided"));
        }

        let mut db_tx = self.db_pool.begin().await?;

        let updated = sqlx::query_as::<_, Proposal>(
            r#"
            UPDATE proposals
            SET status = $1, updated_at = NOW()
            WHERE id = $2 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(new_status)
        .bind(proposal_id)
        .fetch_optional(&mut *db_tx)
        .await?
        .ok_or(ProposalError::NotPending("decided"))?;

        notification::insert_in_tx(
            &mut db_tx,
            updated.freelancer_id,
            "proposal_status",
            &format!("Your proposal was {}", new_status.as_str()),
            None,
            Some(&format!("/proposals/{}", updated.id)),
        )
        .await?;

        db_tx.commit().await?;

        tracing::info!(
            proposal_id = %proposal_id,
            status = new_status.as_str(),
            "Proposal decided"
        );

        Ok(updated)
    }

    /// Delete an own, non-accepted proposal
    pub async fn delete(&self, freelancer_id: Uuid, proposal_id: Uuid) -> Result<(), ProposalError> {
        let proposal = self.fetch(proposal_id).await?;

        if proposal.freelancer_id != freelancer_id {
            return Err(ProposalError::NotOwner);
        }

        if proposal.status == ProposalStatus::Accepted {
            return Err(ProposalError::AcceptedImmutable);
        }

        sqlx::query("DELETE FROM proposals WHERE id = $1")
            .bind(proposal_id)
            .execute(&self.db_pool)
            .await?;

        Ok(())
    }

    /// All proposals, newest first (admin dashboard)
    pub async fn admin_list(&self) -> Result<Vec<Proposal>, ProposalError> {
        let proposals =
            sqlx::query_as::<_, Proposal>("SELECT * FROM proposals ORDER BY created_at DESC")
                .fetch_all(&self.db_pool)
                .await?;

        Ok(proposals)
    }

    async fn fetch(&self, id: Uuid) -> Result<Proposal, ProposalError> {
        sqlx::query_as::<_, Proposal>("SELECT * FROM proposals WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or(ProposalError::NotFound)
    }
}
