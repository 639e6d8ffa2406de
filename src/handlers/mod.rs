//! API handlers for the GigScape backend

pub mod auth;
pub mod chat;
pub mod contract;
pub mod job;
pub mod milestone;
pub mod notification;
pub mod proposal;
pub mod review;
pub mod transaction;
pub mod user;
pub mod wallet;

// Re-export extractors from middleware for handler use
pub use crate::middleware::auth::{AdminUser, AuthenticatedUser, OptionalUser};
