//! Job HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::handlers::AuthenticatedUser;
use crate::job::{CreateJobRequest, Job, JobError};
use crate::models::UserRole;
use crate::state::AppState;

impl From<JobError> for ApiError {
    fn from(e: JobError) -> Self {
        match e {
            JobError::NotFound => ApiError::NotFound("Job not found".to_string()),
            JobError::NotOwner => {
                ApiError::Forbidden("Only the job's client may do this".to_string())
            }
            JobError::DatabaseError(msg) => ApiError::DatabaseError(msg),
        }
    }
}

/// POST /jobs - Post a job (client role)
pub async fn create_job(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<Job>), ApiError> {
    request.validate()?;

    if user.role != UserRole::Client {
        return Err(ApiError::Forbidden("Only clients can post jobs".to_string()));
    }

    let job = state.job_service.create_job(user.user_id, request).await?;

    Ok((StatusCode::CREATED, Json(job)))
}

/// GET /jobs - Open jobs, newest first
pub async fn list_open_jobs(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<Json<Vec<Job>>, ApiError> {
    let jobs = state.job_service.list_open().await?;
    Ok(Json(jobs))
}

/// GET /jobs/me - Jobs posted by the caller
pub async fn list_my_jobs(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Job>>, ApiError> {
    let jobs = state.job_service.list_for_client(user.user_id).await?;
    Ok(Json(jobs))
}

/// GET /jobs/:id - Fetch a single job
pub async fn get_job_by_id(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Job>, ApiError> {
    let job = state.job_service.get_job(id).await?;
    Ok(Json(job))
}

/// PUT /jobs/:id/close - Close a job to further proposals
pub async fn close_job(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Job>, ApiError> {
    let job = state.job_service.close_job(user.user_id, id).await?;
    Ok(Json(job))
}
