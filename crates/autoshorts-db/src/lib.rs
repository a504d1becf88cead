//! PostgreSQL persistence gateway.
//!
//! This crate provides:
//! - The [`VideoStore`] seam used by the orchestrators
//! - A sqlx implementation with embedded migrations
//! - Query metrics

pub mod config;
pub mod error;
pub mod metrics;
pub mod store;

pub use config::DbConfig;
pub use error::{DbError, DbResult};
pub use store::{PgVideoStore, VideoStore};
