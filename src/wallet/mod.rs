//! Wallet domain module
//!
//! Balance and hold bookkeeping for user wallets. Every balance-affecting
//! operation records a ledger transaction in the same database transaction.

mod model;
mod service;

pub use model::*;
pub use service::{WalletError, WalletService};
