//! Grant subject domain model.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The holder of a set of permission grants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrantSubject {
    User(String),
    UserGroup(String),
}

impl GrantSubject {
    /// Storage discriminator for the subject kind.
    pub fn kind(&self) -> &'static str {
        match self {
            GrantSubject::User(_) => "user",
            GrantSubject::UserGroup(_) => "user_group",
        }
    }

    pub fn identifier(&self) -> &str {
        match self {
            GrantSubject::User(id) | GrantSubject::UserGroup(id) => id,
        }
    }
}

impl fmt::Display for GrantSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.identifier())
    }
}
