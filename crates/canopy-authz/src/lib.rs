//! Canopy Authz — permission sets bound to a subject and scope, the access
//! policy deciding who may view or alter them, and hierarchy maintenance
//! for grouped directory objects.

pub mod actor;
pub mod config;
pub mod error;
pub mod hierarchy;
pub mod permission_set;
pub mod policy;

pub use actor::Actor;
pub use config::AuthzConfig;
pub use error::AuthzError;
pub use hierarchy::DirectoryHierarchy;
pub use permission_set::StoredPermissionSet;
pub use policy::AccessPolicy;
