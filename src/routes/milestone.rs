//! Milestone route definitions

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::handlers::milestone;
use crate::state::AppState;

pub fn milestone_routes() -> Router<AppState> {
    Router::new()
        .route("/api/milestones", post(milestone::create_milestone))
        .route("/api/milestones/admin", get(milestone::get_admin_milestones))
        .route(
            "/api/milestones/contract/:contract_id",
            get(milestone::get_milestones),
        )
        .route("/api/milestones/:id", get(milestone::get_milestone_by_id))
        .route("/api/milestones/:id", put(milestone::update_milestone))
        .route("/api/milestones/:id", delete(milestone::delete_milestone))
        .route(
            "/api/milestones/:id/status",
            put(milestone::update_milestone_status),
        )
        .route(
            "/api/milestones/:id/attachments",
            post(milestone::attach_file),
        )
}
