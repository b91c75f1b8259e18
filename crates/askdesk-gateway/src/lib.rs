//! # AskDesk Gateway
//!
//! HTTP API over the `Assistant`: chat, suggestions, feedback, and the
//! operator endpoints for rebuild and missed-query review.

pub mod routes;
pub mod server;

pub use server::{AppState, build_router, start};
