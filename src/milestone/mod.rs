//! Milestone domain module
//!
//! Funded sub-deliverables of a contract with an enforced status state
//! machine. Completing the last milestone promotes the owning contract.

mod model;
mod service;

pub use model::*;
pub use service::{overdue_detector, MilestoneError, MilestoneService};
