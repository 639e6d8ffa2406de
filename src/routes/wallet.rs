//! Wallet route definitions

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::handlers::wallet;
use crate::state::AppState;

pub fn wallet_routes() -> Router<AppState> {
    Router::new()
        .route("/api/wallets", post(wallet::create_wallet))
        .route("/api/wallets/me", get(wallet::get_wallet))
        .route("/api/wallets/me/balance", get(wallet::get_balance))
        .route(
            "/api/wallets/me/transactions",
            get(wallet::get_wallet_transactions),
        )
        .route("/api/wallets/deposit", post(wallet::deposit_funds))
        .route("/api/wallets/withdraw", post(wallet::withdraw_funds))
        .route("/api/wallets/holds", post(wallet::hold_funds))
        .route(
            "/api/wallets/holds/:related_id",
            delete(wallet::release_hold),
        )
}
