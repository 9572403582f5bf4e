//! Permission domain model.
//!
//! A grant is the fact that a subject holds one permission within a
//! scope. The subject and scope are fixed by the permission set that
//! owns the grant, so a [`GrantRecord`] only carries the permission name
//! and, for object scopes, the target object.

use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::error::{CanopyError, CanopyResult};
use crate::models::grouped_object::ObjectType;

/// The part of the permission space a permission set covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PermissionScope {
    /// Permissions over the system as a whole.
    System,
    /// Permissions over objects of one type.
    Object(ObjectType),
}

impl PermissionScope {
    /// Storage discriminator for the scope.
    pub fn as_str(self) -> &'static str {
        match self {
            PermissionScope::System => "system",
            PermissionScope::Object(ObjectType::Connection) => "connection",
            PermissionScope::Object(ObjectType::ConnectionGroup) => "connection_group",
            PermissionScope::Object(ObjectType::UserGroup) => "user_group",
        }
    }

    pub fn is_object(self) -> bool {
        matches!(self, PermissionScope::Object(_))
    }
}

impl fmt::Display for PermissionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage form of a single grant within a (subject, scope) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GrantRecord {
    pub permission: String,
    pub target: Option<String>,
}

/// A permission type that can be held in a permission set.
///
/// Equality and hashing define set membership: two values that compare
/// equal are the same grant.
pub trait Permission: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static {
    /// Whether permissions of this type may be held in `scope`.
    fn supports_scope(scope: PermissionScope) -> bool;

    fn to_grant(&self) -> GrantRecord;

    fn from_grant(grant: GrantRecord) -> CanopyResult<Self>;
}

// ---------------------------------------------------------------------------
// System permissions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SystemPermission {
    CreateConnection,
    CreateConnectionGroup,
    CreateUser,
    CreateUserGroup,
    Administer,
}

impl SystemPermission {
    pub fn as_str(self) -> &'static str {
        match self {
            SystemPermission::CreateConnection => "CREATE_CONNECTION",
            SystemPermission::CreateConnectionGroup => "CREATE_CONNECTION_GROUP",
            SystemPermission::CreateUser => "CREATE_USER",
            SystemPermission::CreateUserGroup => "CREATE_USER_GROUP",
            SystemPermission::Administer => "ADMINISTER",
        }
    }
}

impl Permission for SystemPermission {
    fn supports_scope(scope: PermissionScope) -> bool {
        scope == PermissionScope::System
    }

    fn to_grant(&self) -> GrantRecord {
        GrantRecord {
            permission: self.as_str().to_owned(),
            target: None,
        }
    }

    fn from_grant(grant: GrantRecord) -> CanopyResult<Self> {
        if let Some(target) = grant.target {
            return Err(CanopyError::Validation {
                message: format!("system permission {} has target {target}", grant.permission),
            });
        }
        match grant.permission.as_str() {
            "CREATE_CONNECTION" => Ok(SystemPermission::CreateConnection),
            "CREATE_CONNECTION_GROUP" => Ok(SystemPermission::CreateConnectionGroup),
            "CREATE_USER" => Ok(SystemPermission::CreateUser),
            "CREATE_USER_GROUP" => Ok(SystemPermission::CreateUserGroup),
            "ADMINISTER" => Ok(SystemPermission::Administer),
            other => Err(CanopyError::Validation {
                message: format!("unknown system permission: {other}"),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Object permissions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectPermissionType {
    Read,
    Update,
    Delete,
    Administer,
}

impl ObjectPermissionType {
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectPermissionType::Read => "READ",
            ObjectPermissionType::Update => "UPDATE",
            ObjectPermissionType::Delete => "DELETE",
            ObjectPermissionType::Administer => "ADMINISTER",
        }
    }

    fn parse(s: &str) -> CanopyResult<Self> {
        match s {
            "READ" => Ok(ObjectPermissionType::Read),
            "UPDATE" => Ok(ObjectPermissionType::Update),
            "DELETE" => Ok(ObjectPermissionType::Delete),
            "ADMINISTER" => Ok(ObjectPermissionType::Administer),
            other => Err(CanopyError::Validation {
                message: format!("unknown object permission: {other}"),
            }),
        }
    }
}

/// Permission to act on one specific object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectPermission {
    pub kind: ObjectPermissionType,
    pub object_identifier: String,
}

impl ObjectPermission {
    pub fn new(kind: ObjectPermissionType, object_identifier: impl Into<String>) -> Self {
        Self {
            kind,
            object_identifier: object_identifier.into(),
        }
    }
}

impl Permission for ObjectPermission {
    fn supports_scope(scope: PermissionScope) -> bool {
        scope.is_object()
    }

    fn to_grant(&self) -> GrantRecord {
        GrantRecord {
            permission: self.kind.as_str().to_owned(),
            target: Some(self.object_identifier.clone()),
        }
    }

    fn from_grant(grant: GrantRecord) -> CanopyResult<Self> {
        let kind = ObjectPermissionType::parse(&grant.permission)?;
        let object_identifier = grant.target.ok_or_else(|| CanopyError::Validation {
            message: format!("object permission {} has no target", grant.permission),
        })?;
        Ok(Self {
            kind,
            object_identifier,
        })
    }
}
