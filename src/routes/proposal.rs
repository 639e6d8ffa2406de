//! Proposal route definitions

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::handlers::proposal;
use crate::state::AppState;

pub fn proposal_routes() -> Router<AppState> {
    Router::new()
        .route("/api/proposals", post(proposal::submit_proposal))
        .route("/api/proposals/me", get(proposal::get_my_proposals))
        .route("/api/proposals/admin", get(proposal::get_admin_proposals))
        .route(
            "/api/proposals/job/:job_id",
            get(proposal::get_job_proposals),
        )
        .route("/api/proposals/:id", get(proposal::get_proposal_by_id))
        .route("/api/proposals/:id", delete(proposal::delete_proposal))
        .route(
            "/api/proposals/:id/withdraw",
            put(proposal::withdraw_proposal),
        )
        .route(
            "/api/proposals/:id/status",
            put(proposal::update_proposal_status),
        )
}
