//! Contactbook REST API
//!
//! This crate provides the Axum-based HTTP API for Contactbook: the login
//! endpoint, the user routes guarded by the access gate, and the
//! operational endpoints.

pub mod error;
pub mod routes;
pub mod state;

#[cfg(test)]
mod test_support;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{AppState, MetricsHandle};
