//! Proposal domain module
//!
//! Freelancer bids on jobs. An accepted proposal is the only way a
//! contract comes into existence.

mod model;
mod service;

pub use model::*;
pub use service::{ProposalError, ProposalService};
