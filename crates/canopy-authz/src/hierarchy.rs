//! Maintenance of the grouped object hierarchy.

use canopy_core::directory::GroupedDirectoryObject;
use canopy_core::error::{CanopyError, CanopyResult};
use canopy_core::hierarchy::{is_root, to_effective, to_stored};
use canopy_core::models::grouped_object::{CreateGroupedObject, ObjectType};
use canopy_core::repository::GroupedObjectRepository;
use tracing::{info, warn};

use crate::config::AuthzConfig;
use crate::error::AuthzError;

/// Loads, creates, and moves grouped objects while keeping the hierarchy
/// a tree rooted at [`ROOT_IDENTIFIER`](canopy_core::hierarchy::ROOT_IDENTIFIER).
///
/// Generic over the repository implementation so that this layer has no
/// dependency on the database crate.
pub struct DirectoryHierarchy<R: GroupedObjectRepository> {
    repo: R,
    config: AuthzConfig,
}

impl<R: GroupedObjectRepository> DirectoryHierarchy<R> {
    pub fn new(repo: R, config: AuthzConfig) -> Self {
        Self { repo, config }
    }

    /// Load an object, snapshotting its current parent as the initial one.
    pub async fn load(&self, identifier: &str) -> CanopyResult<GroupedDirectoryObject> {
        let record = self.repo.get_by_id(identifier).await?;
        Ok(GroupedDirectoryObject::from_record(record))
    }

    /// Create an object under the effective parent `parent_identifier`.
    pub async fn create(
        &self,
        name: impl Into<String>,
        object_type: ObjectType,
        parent_identifier: &str,
    ) -> CanopyResult<GroupedDirectoryObject> {
        self.validate_parent(None, object_type, parent_identifier)
            .await?;

        let record = self
            .repo
            .create(CreateGroupedObject {
                name: name.into(),
                object_type,
                parent_identifier: to_stored(parent_identifier).map(str::to_owned),
            })
            .await?;

        Ok(GroupedDirectoryObject::from_record(record))
    }

    /// Persist the object's parent if it moved since it was loaded.
    ///
    /// Returns `false` without touching storage when the parent is
    /// unchanged.
    ///
    /// Validation and the write are separate round-trips, so a concurrent
    /// move can slip in between them. The chain is therefore walked again
    /// after the write; if the object now sits under itself, its parent is
    /// restored to the loaded one and the move fails as a cycle. Of two
    /// racing moves that close a loop, the later check always sees it.
    pub async fn save_parent(&self, object: &GroupedDirectoryObject) -> CanopyResult<bool> {
        if !object.has_moved() {
            return Ok(false);
        }

        let identifier = object.identifier();
        let parent = object.parent_identifier();

        self.validate_parent(Some(identifier), object.object_type(), parent)
            .await?;

        self.repo
            .save_parent(identifier, object.stored_parent_identifier())
            .await?;

        if !is_root(parent) && self.reaches(parent, identifier).await? {
            self.repo
                .save_parent(identifier, to_stored(object.initial_parent_identifier()))
                .await?;
            warn!(
                object = identifier,
                to = parent,
                "Concurrent move closed a cycle, parent restored"
            );
            return Err(AuthzError::Cycle {
                object: identifier.to_owned(),
                parent: parent.to_owned(),
            }
            .into());
        }

        info!(
            object = identifier,
            from = object.initial_parent_identifier(),
            to = parent,
            "Grouped object moved"
        );
        Ok(true)
    }

    /// Objects directly under the effective parent `parent_identifier`.
    pub async fn children(
        &self,
        parent_identifier: &str,
    ) -> CanopyResult<Vec<GroupedDirectoryObject>> {
        if !is_root(parent_identifier) {
            self.repo.get_by_id(parent_identifier).await?;
        }

        let records = self
            .repo
            .get_children(to_stored(parent_identifier))
            .await?;

        Ok(records
            .into_iter()
            .map(GroupedDirectoryObject::from_record)
            .collect())
    }

    /// Effective parent chain of an object, nearest first, ending with
    /// [`ROOT_IDENTIFIER`](canopy_core::hierarchy::ROOT_IDENTIFIER).
    pub async fn ancestors(&self, identifier: &str) -> CanopyResult<Vec<String>> {
        let mut ancestors = Vec::new();
        let mut current = identifier.to_owned();

        for _ in 0..self.config.max_hierarchy_depth {
            let parent = self.repo.load_parent(&current).await?;
            ancestors.push(to_effective(parent.as_deref()).to_owned());
            match parent {
                Some(parent) => current = parent,
                None => return Ok(ancestors),
            }
        }

        Err(AuthzError::DepthExceeded(self.config.max_hierarchy_depth).into())
    }

    /// Check that `parent_identifier` may hold an object of `child_type`.
    /// `object` is the identifier of the object being moved, if it exists.
    async fn validate_parent(
        &self,
        object: Option<&str>,
        child_type: ObjectType,
        parent_identifier: &str,
    ) -> Result<(), AuthzError> {
        if is_root(parent_identifier) {
            return Ok(());
        }

        if object == Some(parent_identifier) {
            return Err(AuthzError::SelfParent(parent_identifier.to_owned()));
        }

        let parent = match self.repo.get_by_id(parent_identifier).await {
            Ok(parent) => parent,
            Err(CanopyError::NotFound { .. }) => {
                return Err(AuthzError::MissingParent(parent_identifier.to_owned()));
            }
            Err(e) => return Err(e.into()),
        };

        if !parent.object_type.accepts_child(child_type) {
            return Err(AuthzError::InvalidParentType {
                parent: parent.object_type,
                child: child_type,
            });
        }

        if let Some(object) = object {
            if self.reaches(parent_identifier, object).await? {
                return Err(AuthzError::Cycle {
                    object: object.to_owned(),
                    parent: parent_identifier.to_owned(),
                });
            }
        }

        Ok(())
    }

    /// Whether walking up from `start` arrives at `target`, counting
    /// `start` itself.
    async fn reaches(&self, start: &str, target: &str) -> Result<bool, AuthzError> {
        let mut current = start.to_owned();

        for _ in 0..self.config.max_hierarchy_depth {
            if current == target {
                return Ok(true);
            }
            match self.repo.load_parent(&current).await? {
                Some(parent) => current = parent,
                None => return Ok(false),
            }
        }

        Err(AuthzError::DepthExceeded(self.config.max_hierarchy_depth))
    }
}
