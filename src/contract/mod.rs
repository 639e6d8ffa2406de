//! Contract domain module
//!
//! Contracts between clients and freelancers, their status lifecycle, and
//! the milestone-completion reconciliation that promotes a contract to
//! `completed`.

mod model;
mod service;

pub use model::*;
pub use service::{reconcile_completion, ContractError, ContractService};
