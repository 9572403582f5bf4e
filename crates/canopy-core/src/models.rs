//! Domain models for canopy.
//!
//! These are the core types shared across all crates.

pub mod grouped_object;
pub mod permission;
pub mod subject;
