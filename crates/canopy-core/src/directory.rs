//! Directory objects that live in the single-parent hierarchy.

use chrono::{DateTime, Utc};

use crate::hierarchy::ParentIdentity;
use crate::models::grouped_object::{GroupedObject, ObjectType};

/// A grouped object as exposed to the directory layer.
///
/// Parent accessors delegate to the embedded [`ParentIdentity`], so
/// callers only ever see effective parent identifiers.
#[derive(Debug, Clone)]
pub struct GroupedDirectoryObject {
    identifier: String,
    name: String,
    object_type: ObjectType,
    parent: ParentIdentity,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl GroupedDirectoryObject {
    /// Initialize from a freshly loaded record, capturing its parent as
    /// the initial parent.
    pub fn from_record(record: GroupedObject) -> Self {
        Self {
            identifier: record.identifier,
            name: record.name,
            object_type: record.object_type,
            parent: ParentIdentity::from_stored(record.parent_identifier),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn object_type(&self) -> ObjectType {
        self.object_type
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn parent_identifier(&self) -> &str {
        self.parent.effective()
    }

    pub fn set_parent_identifier(&mut self, identifier: impl Into<String>) {
        self.parent.set_effective(identifier);
    }

    /// The parent this object had when it was loaded.
    pub fn initial_parent_identifier(&self) -> &str {
        self.parent.initial()
    }

    /// The parent reference in storage form, for persistence.
    pub fn stored_parent_identifier(&self) -> Option<&str> {
        self.parent.stored()
    }

    pub fn has_moved(&self) -> bool {
        self.parent.has_moved()
    }

    /// Storage form of the object's current state.
    pub fn to_record(&self) -> GroupedObject {
        GroupedObject {
            identifier: self.identifier.clone(),
            name: self.name.clone(),
            object_type: self.object_type,
            parent_identifier: self.parent.stored().map(str::to_owned),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
