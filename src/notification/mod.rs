//! Notification domain module

mod model;
mod service;

pub use model::*;
pub use service::{insert_in_tx, NotificationError, NotificationService};
