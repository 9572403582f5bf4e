//! The permission set contract.

use std::collections::HashSet;

use crate::error::CanopyResult;
use crate::models::permission::Permission;

/// The grants held by one subject within one scope.
///
/// Add and remove are set-difference operations: adding a grant that is
/// already held, or removing one that is not, does nothing and is not an
/// error. Each batch is applied atomically; concurrent readers see either
/// all of it or none of it.
pub trait PermissionSet<P: Permission>: Send + Sync {
    /// Returns every grant currently held.
    ///
    /// Fails with [`CanopyError::Retrieval`](crate::error::CanopyError::Retrieval)
    /// if the store is unavailable or the caller may not view the set.
    fn get_permissions(&self) -> impl Future<Output = CanopyResult<HashSet<P>>> + Send;

    /// Grants each permission in `permissions` that is not already held.
    ///
    /// Fails with [`CanopyError::Mutation`](crate::error::CanopyError::Mutation)
    /// if the caller may not grant them or the store rejects the write.
    fn add_permissions(
        &self,
        permissions: HashSet<P>,
    ) -> impl Future<Output = CanopyResult<()>> + Send;

    /// Revokes each permission in `permissions` that is currently held.
    fn remove_permissions(
        &self,
        permissions: HashSet<P>,
    ) -> impl Future<Output = CanopyResult<()>> + Send;
}
