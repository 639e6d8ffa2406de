//! Job domain module
//!
//! Minimal job surface: the rest of the system (proposals, contracts,
//! reviews) hangs off these rows.

mod model;
mod service;

pub use model::*;
pub use service::{JobError, JobService};
