//! Job service layer

use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::job::{CreateJobRequest, Job, JobStatus};

/// Job service errors
#[derive(Error, Debug)]
pub enum JobError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Job not found")]
    NotFound,

    #[error("Only the job's client may do this")]
    NotOwner,
}

impl From<sqlx::Error> for JobError {
    fn from(e: sqlx::Error) -> Self {
        JobError::DatabaseError(e.to_string())
    }
}

/// Job service
#[derive(Clone)]
pub struct JobService {
    db_pool: PgPool,
    default_currency: String,
}

impl JobService {
    pub fn new(db_pool: PgPool, default_currency: String) -> Self {
        Self {
            db_pool,
            default_currency,
        }
    }

    /// Post a new job
    pub async fn create_job(
        &self,
        client_id: Uuid,
        request: CreateJobRequest,
    ) -> Result<Job, JobError> {
        let currency = request
            .currency
            .unwrap_or_else(|| self.default_currency.clone());

        let job = sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs (id, client_id, title, description, budget_min, budget_max, currency, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'open')
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(client_id)
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.budget_min)
        .bind(request.budget_max)
        .bind(&currency)
        .fetch_one(&self.db_pool)
        .await?;

        tracing::info!(job_id = %job.id, "Job posted");

        Ok(job)
    }

    /// Get a single job
    pub async fn get_job(&self, id: Uuid) -> Result<Job, JobError> {
        sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or(JobError::NotFound)
    }

    /// Open jobs, newest first
    pub async fn list_open(&self) -> Result<Vec<Job>, JobError> {
        let jobs = sqlx::query_as::<_, Job>(
            "SELECT * FROM jobs WHERE status = 'open' ORDER BY created_at DESC",
        )
        .fetch_all(&self.db_pool)
        .await?;

        Ok(jobs)
    }

    /// Jobs posted by a client, newest first
    pub async fn list_for_client(&self, client_id: Uuid) -> Result<Vec<Job>, JobError> {
        let jobs = sqlx::query_as::<_, Job>(
            "SELECT * FROM jobs WHERE client_id = $1 ORDER BY created_at DESC",
        )
        .bind(client_id)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(jobs)
    }

    /// Close a job to further proposals (owner only)
    pub async fn close_job(&self, client_id: Uuid, job_id: Uuid) -> Result<Job, JobError> {
        let job = self.get_job(job_id).await?;

        if job.client_id != client_id {
            return Err(JobError::NotOwner);
        }

        let updated = sqlx::query_as::<_, Job>(
            r#"
            UPDATE jobs
            SET status = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING *
            "#,
        )
        .bind(JobStatus::Closed)
        .bind(job_id)
        .fetch_optional(&self.db_pool)
        .await?;

        updated.ok_or(JobError::NotFound)
    }
}
