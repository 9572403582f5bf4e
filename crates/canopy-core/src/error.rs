//! Error types for the canopy system.

use std::fmt;

use thiserror::Error;

/// Why a permission-set read or mutation failed.
///
/// Callers use this to decide between presenting "access denied" and a
/// generic failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureCause {
    /// The acting user lacks the rights to view or alter the set.
    PermissionDenied(String),
    /// The backing store was unreachable or failed the request.
    Storage(String),
    /// The request or the store rejected the data itself.
    Constraint(String),
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureCause::PermissionDenied(reason) => write!(f, "permission denied: {reason}"),
            FailureCause::Storage(reason) => write!(f, "storage failure: {reason}"),
            FailureCause::Constraint(reason) => write!(f, "constraint violated: {reason}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum CanopyError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Permission retrieval failed: {cause}")]
    Retrieval { cause: FailureCause },

    #[error("Permission mutation failed: {cause}")]
    Mutation { cause: FailureCause },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CanopyError {
    /// Re-classify a collaborator failure as a failed permission read.
    pub fn into_retrieval(self) -> Self {
        match self {
            err @ CanopyError::Retrieval { .. } => err,
            CanopyError::Mutation { cause } => CanopyError::Retrieval { cause },
            CanopyError::Validation { message } => CanopyError::Retrieval {
                cause: FailureCause::Constraint(message),
            },
            other => CanopyError::Retrieval {
                cause: FailureCause::Storage(other.to_string()),
            },
        }
    }

    /// Re-classify a collaborator failure as a failed permission mutation.
    pub fn into_mutation(self) -> Self {
        match self {
            err @ CanopyError::Mutation { .. } => err,
            CanopyError::Retrieval { cause } => CanopyError::Mutation { cause },
            CanopyError::Validation { message } => CanopyError::Mutation {
                cause: FailureCause::Constraint(message),
            },
            other => CanopyError::Mutation {
                cause: FailureCause::Storage(other.to_string()),
            },
        }
    }

    /// Whether the failure was caused by the caller's lack of rights.
    pub fn is_permission_denied(&self) -> bool {
        matches!(
            self,
            CanopyError::Retrieval {
                cause: FailureCause::PermissionDenied(_)
            } | CanopyError::Mutation {
                cause: FailureCause::PermissionDenied(_)
            }
        )
    }
}

pub type CanopyResult<T> = Result<T, CanopyError>;
