//! Contract route definitions

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::handlers::contract;
use crate::state::AppState;

pub fn contract_routes() -> Router<AppState> {
    Router::new()
        .route("/api/contracts", post(contract::create_contract))
        .route("/api/contracts/me", get(contract::get_my_contracts))
        .route(
            "/api/contracts/admin/stats",
            get(contract::get_admin_contract_stats),
        )
        .route("/api/contracts/:id", get(contract::get_contract_by_id))
        .route("/api/contracts/:id", put(contract::update_contract))
        .route("/api/contracts/:id", delete(contract::delete_contract))
        .route(
            "/api/contracts/:id/status",
            put(contract::update_contract_status),
        )
        .route(
            "/api/contracts/:id/escrow",
            put(contract::update_escrow_status),
        )
}
