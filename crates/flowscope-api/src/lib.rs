//! Flowscope-api: HTTP API layer for Flowscope
//!
//! Exposes the session feed contract over REST for the dashboard frontend.

pub mod dto;
pub mod routes;
pub mod server;
pub mod state;

pub use server::*;
pub use state::AppState;
