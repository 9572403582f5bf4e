//! Authorization service configuration.

/// Configuration for the permission set and hierarchy services.
#[derive(Debug, Clone)]
pub struct AuthzConfig {
    /// Largest number of grants accepted in one add/remove batch
    /// (default: 1000).
    pub max_batch_size: usize,
    /// Deepest ancestor chain walked while validating a move
    /// (default: 50).
    pub max_hierarchy_depth: usize,
}

impl Default for AuthzConfig {
    fn default() -> Self {
        Self {
            max_batch_size: 1000,
            max_hierarchy_depth: 50,
        }
    }
}
