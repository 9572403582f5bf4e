//! The authenticated caller on whose behalf permission sets are used.

use std::fmt;

use canopy_core::models::subject::GrantSubject;

/// Who is performing an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    /// Internal work (bootstrap, migrations) that bypasses access checks.
    Unrestricted,
    /// A user, acting with its own grants plus those of its groups.
    User { user: String, groups: Vec<String> },
}

impl Actor {
    pub fn user(user: impl Into<String>) -> Self {
        Actor::User {
            user: user.into(),
            groups: Vec::new(),
        }
    }

    /// Attach the user groups the acting user belongs to.
    pub fn with_groups<I, S>(self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match self {
            Actor::User { user, .. } => Actor::User {
                user,
                groups: groups.into_iter().map(Into::into).collect(),
            },
            Actor::Unrestricted => Actor::Unrestricted,
        }
    }

    /// Every subject whose grants apply to this actor.
    pub fn subjects(&self) -> Vec<GrantSubject> {
        match self {
            Actor::Unrestricted => Vec::new(),
            Actor::User { user, groups } => std::iter::once(GrantSubject::User(user.clone()))
                .chain(groups.iter().cloned().map(GrantSubject::UserGroup))
                .collect(),
        }
    }

    /// Whether `subject` is this actor or one of its groups.
    pub fn represents(&self, subject: &GrantSubject) -> bool {
        match (self, subject) {
            (Actor::User { user, .. }, GrantSubject::User(id)) => user == id,
            (Actor::User { groups, .. }, GrantSubject::UserGroup(id)) => groups.contains(id),
            (Actor::Unrestricted, _) => false,
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Actor::Unrestricted => f.write_str("unrestricted"),
            Actor::User { user, .. } => write!(f, "user:{user}"),
        }
    }
}
