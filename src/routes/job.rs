//! Job route definitions

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::handlers::job;
use crate::state::AppState;

pub fn job_routes() -> Router<AppState> {
    Router::new()
        .route("/api/jobs", post(job::create_job))
        .route("/api/jobs", get(job::list_open_jobs))
        .route("/api/jobs/me", get(job::list_my_jobs))
        .route("/api/jobs/:id", get(job::get_job_by_id))
        .route("/api/jobs/:id/close", put(job::close_job))
}
