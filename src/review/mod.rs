//! Review domain module
//!
//! Feedback tied to completed contracts: one review per (contract,
//! reviewer), rating bounded to 1..=5.

mod model;
mod service;

pub use model::*;
pub use service::{ReviewError, ReviewService};
