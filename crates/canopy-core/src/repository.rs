//! Storage collaborator traits.
//!
//! All repository operations are async. Parent references handed to and
//! returned from [`GroupedObjectRepository`] are in storage form: `None`
//! means "directly under the root".

use std::collections::HashSet;

use crate::error::CanopyResult;
use crate::models::{
    grouped_object::{CreateGroupedObject, GroupedObject},
    permission::{GrantRecord, PermissionScope},
    subject::GrantSubject,
};

// ---------------------------------------------------------------------------
// Grouped objects
// ---------------------------------------------------------------------------

pub trait GroupedObjectRepository: Send + Sync {
    fn create(
        &self,
        input: CreateGroupedObject,
    ) -> impl Future<Output = CanopyResult<GroupedObject>> + Send;
    fn get_by_id(
        &self,
        identifier: &str,
    ) -> impl Future<Output = CanopyResult<GroupedObject>> + Send;
    fn delete(&self, identifier: &str) -> impl Future<Output = CanopyResult<()>> + Send;

    /// Load only the stored parent reference of an object.
    fn load_parent(
        &self,
        identifier: &str,
    ) -> impl Future<Output = CanopyResult<Option<String>>> + Send;

    /// Overwrite the stored parent reference of an object.
    fn save_parent(
        &self,
        identifier: &str,
        parent_identifier: Option<&str>,
    ) -> impl Future<Output = CanopyResult<()>> + Send;

    /// All objects whose stored parent equals `parent_identifier`.
    fn get_children(
        &self,
        parent_identifier: Option<&str>,
    ) -> impl Future<Output = CanopyResult<Vec<GroupedObject>>> + Send;
}

// ---------------------------------------------------------------------------
// Permission grants
// ---------------------------------------------------------------------------

pub trait GrantRepository: Send + Sync {
    fn select_grants(
        &self,
        subject: &GrantSubject,
        scope: PermissionScope,
    ) -> impl Future<Output = CanopyResult<HashSet<GrantRecord>>> + Send;

    /// Insert every grant not already present, in one transaction.
    fn insert_grants(
        &self,
        subject: &GrantSubject,
        scope: PermissionScope,
        grants: &HashSet<GrantRecord>,
    ) -> impl Future<Output = CanopyResult<()>> + Send;

    /// Delete every grant that is present, in one transaction.
    fn delete_grants(
        &self,
        subject: &GrantSubject,
        scope: PermissionScope,
        grants: &HashSet<GrantRecord>,
    ) -> impl Future<Output = CanopyResult<()>> + Send;
}
