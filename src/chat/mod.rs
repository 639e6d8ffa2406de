//! Chat domain module
//!
//! Rooms and messages between contract parties. This is the REST surface
//! only; live delivery rides an external transport.

mod model;
mod service;

pub use model::*;
pub use service::{ChatError, ChatService};
