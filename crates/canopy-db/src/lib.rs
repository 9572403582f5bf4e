//! Canopy Database — SurrealDB connection management and the storage
//! collaborator implementations for grouped objects and permission grants.
//!
//! This crate provides:
//! - Connection management ([`DbManager`], [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - Error types ([`DbError`])
//! - Repository implementations of the `canopy-core` traits
//!   ([`repository::SurrealGroupedObjectRepository`],
//!   [`repository::SurrealGrantRepository`])

mod connection;
mod error;
pub mod repository;
mod schema;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use schema::run_migrations;
