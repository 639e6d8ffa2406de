//! Transaction route definitions

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::handlers::transaction;
use crate::state::AppState;

pub fn transaction_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/transactions/stripe/intent",
            post(transaction::create_stripe_payment_intent),
        )
        .route(
            "/api/transactions/stripe/confirm",
            post(transaction::confirm_stripe_payment),
        )
        .route(
            "/api/transactions/:id/refund",
            post(transaction::refund_stripe_payment),
        )
        .route(
            "/api/transactions/manual",
            post(transaction::create_manual_transaction),
        )
        .route(
            "/api/transactions/admin/stats",
            get(transaction::get_admin_transaction_stats),
        )
        .route("/api/transactions", get(transaction::get_user_transactions))
        .route(
            "/api/transactions/:id",
            get(transaction::get_transaction_by_id),
        )
        .route(
            "/api/transactions/:id/status",
            put(transaction::update_transaction_status),
        )
}
