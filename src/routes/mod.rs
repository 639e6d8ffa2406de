//! Route definitions for the GigScape API

mod auth;
mod chat;
mod contract;
mod job;
mod milestone;
mod notification;
mod proposal;
mod review;
mod transaction;
mod user;
mod wallet;

pub use auth::auth_routes;
pub use chat::chat_routes;
pub use contract::contract_routes;
pub use job::job_routes;
pub use milestone::milestone_routes;
pub use notification::notification_routes;
pub use proposal::proposal_routes;
pub use review::review_routes;
pub use transaction::transaction_routes;
pub use user::user_routes;
pub use wallet::wallet_routes;
