//! GigScape Backend Library
//!
//! This library exports the core modules for the GigScape marketplace
//! backend server.

pub mod auth;
pub mod chat;
pub mod config;
pub mod contract;
pub mod db;
pub mod error;
pub mod handlers;
pub mod job;
pub mod middleware;
pub mod milestone;
pub mod models;
pub mod notification;
pub mod proposal;
pub mod review;
pub mod routes;
pub mod state;
pub mod transaction;
pub mod wallet;
