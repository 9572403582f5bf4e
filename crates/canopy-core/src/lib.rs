//! Canopy Core — hierarchy identity, permission set contracts, and the
//! storage collaborator traits shared by every canopy crate.

pub mod directory;
pub mod error;
pub mod hierarchy;
pub mod models;
pub mod permission_set;
pub mod repository;
