//! Grouped object domain model.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CanopyError;

/// Kinds of directory objects that take part in the single-parent
/// hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectType {
    Connection,
    ConnectionGroup,
    UserGroup,
}

impl ObjectType {
    /// Whether an object of this type may be the parent of `child`.
    pub fn accepts_child(self, child: ObjectType) -> bool {
        match self {
            ObjectType::ConnectionGroup => matches!(
                child,
                ObjectType::Connection | ObjectType::ConnectionGroup
            ),
            ObjectType::UserGroup => child == ObjectType::UserGroup,
            ObjectType::Connection => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ObjectType::Connection => "Connection",
            ObjectType::ConnectionGroup => "ConnectionGroup",
            ObjectType::UserGroup => "UserGroup",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectType {
    type Err = CanopyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Connection" => Ok(ObjectType::Connection),
            "ConnectionGroup" => Ok(ObjectType::ConnectionGroup),
            "UserGroup" => Ok(ObjectType::UserGroup),
            other => Err(CanopyError::Validation {
                message: format!("unknown object type: {other}"),
            }),
        }
    }
}

/// A grouped object as persisted. `parent_identifier` is `None` for
/// objects attached directly under the root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupedObject {
    pub identifier: String,
    pub name: String,
    pub object_type: ObjectType,
    pub parent_identifier: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGroupedObject {
    pub name: String,
    pub object_type: ObjectType,
    /// Stored parent reference; `None` attaches the object under the root.
    pub parent_identifier: Option<String>,
}
