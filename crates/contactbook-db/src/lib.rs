//! Contactbook Database Layer
//!
//! This crate provides the persistence layer for Contactbook,
//! using SQLite via sqlx for the user records consulted during
//! authentication.

pub mod error;
pub mod models;
pub mod repository;
pub mod utils;

pub use error::DbError;
pub use models::*;
pub use repository::Database;
