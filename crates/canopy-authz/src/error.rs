//! Authorization error types.

use canopy_core::error::{CanopyError, FailureCause};
use canopy_core::models::grouped_object::ObjectType;
use canopy_core::models::permission::PermissionScope;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthzError {
    #[error("{0}")]
    Denied(String),

    #[error("batch of {size} grants exceeds the limit of {limit}")]
    BatchTooLarge { size: usize, limit: usize },

    #[error("grant {permission} is malformed for scope {scope}")]
    MalformedGrant {
        permission: String,
        scope: PermissionScope,
    },

    #[error("permission type cannot be held in scope {0}")]
    UnsupportedScope(PermissionScope),

    #[error("object {0} cannot be its own parent")]
    SelfParent(String),

    #[error("parent {0} does not exist")]
    MissingParent(String),

    #[error("{parent} cannot contain {child}")]
    InvalidParentType { parent: ObjectType, child: ObjectType },

    #[error("moving {object} under {parent} would create a cycle")]
    Cycle { object: String, parent: String },

    #[error("hierarchy deeper than {0} levels")]
    DepthExceeded(usize),

    #[error(transparent)]
    Store(#[from] CanopyError),
}

impl AuthzError {
    /// Classify this error as the cause of a failed permission-set call.
    pub fn into_cause(self) -> FailureCause {
        match self {
            AuthzError::Denied(reason) => FailureCause::PermissionDenied(reason),
            AuthzError::Store(CanopyError::Retrieval { cause })
            | AuthzError::Store(CanopyError::Mutation { cause }) => cause,
            AuthzError::Store(other) => FailureCause::Storage(other.to_string()),
            other => FailureCause::Constraint(other.to_string()),
        }
    }
}

impl From<AuthzError> for CanopyError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::Store(inner) => inner,
            AuthzError::Denied(reason) => CanopyError::Mutation {
                cause: FailureCause::PermissionDenied(reason),
            },
            other => CanopyError::Validation {
                message: other.to_string(),
            },
        }
    }
}
