//! Permission sets backed by the grant store.

use std::collections::HashSet;
use std::marker::PhantomData;

use canopy_core::error::{CanopyError, CanopyResult, FailureCause};
use canopy_core::models::permission::{GrantRecord, Permission, PermissionScope};
use canopy_core::models::subject::GrantSubject;
use canopy_core::permission_set::PermissionSet;
use canopy_core::repository::GrantRepository;
use tracing::{info, warn};

use crate::actor::Actor;
use crate::config::AuthzConfig;
use crate::error::AuthzError;
use crate::policy::AccessPolicy;

/// The grants of one subject within one scope, as seen by one actor.
///
/// Holds no cached state: every call goes to the store, so reads always
/// reflect the latest committed grants.
pub struct StoredPermissionSet<R: GrantRepository, P: Permission> {
    repo: R,
    actor: Actor,
    subject: GrantSubject,
    scope: PermissionScope,
    config: AuthzConfig,
    _permission: PhantomData<fn() -> P>,
}

impl<R: GrantRepository, P: Permission> StoredPermissionSet<R, P> {
    /// Bind a permission set to `subject` and `scope`.
    ///
    /// Fails with a validation error if `P` cannot be held in `scope`.
    pub fn new(
        repo: R,
        actor: Actor,
        subject: GrantSubject,
        scope: PermissionScope,
        config: AuthzConfig,
    ) -> CanopyResult<Self> {
        if !P::supports_scope(scope) {
            return Err(AuthzError::UnsupportedScope(scope).into());
        }
        Ok(Self {
            repo,
            actor,
            subject,
            scope,
            config,
            _permission: PhantomData,
        })
    }

    fn policy(&self) -> AccessPolicy<'_, R> {
        AccessPolicy::new(&self.repo, &self.actor)
    }

    /// Encode a batch into grant records, rejecting oversized batches and
    /// grants whose target does not fit the scope.
    fn encode(&self, permissions: &HashSet<P>) -> Result<HashSet<GrantRecord>, AuthzError> {
        if permissions.len() > self.config.max_batch_size {
            return Err(AuthzError::BatchTooLarge {
                size: permissions.len(),
                limit: self.config.max_batch_size,
            });
        }

        permissions
            .iter()
            .map(|permission| {
                let grant = permission.to_grant();
                if grant.target.is_some() != self.scope.is_object() {
                    return Err(AuthzError::MalformedGrant {
                        permission: grant.permission,
                        scope: self.scope,
                    });
                }
                Ok(grant)
            })
            .collect()
    }

    /// Validate and authorize a mutation batch.
    async fn prepare_mutation(
        &self,
        permissions: &HashSet<P>,
    ) -> Result<HashSet<GrantRecord>, AuthzError> {
        let grants = self.encode(permissions)?;
        self.policy()
            .check_alter(&self.subject, self.scope, &grants)
            .await?;
        Ok(grants)
    }

    fn denial(&self, err: AuthzError, operation: &str) -> AuthzError {
        if let AuthzError::Denied(reason) = &err {
            warn!(
                actor = %self.actor,
                subject = %self.subject,
                scope = %self.scope,
                operation,
                reason = %reason,
                "Permission set access denied"
            );
        }
        err
    }
}

impl<R: GrantRepository, P: Permission> PermissionSet<P> for StoredPermissionSet<R, P> {
    async fn get_permissions(&self) -> CanopyResult<HashSet<P>> {
        self.policy()
            .check_read(&self.subject)
            .await
            .map_err(|e| CanopyError::Retrieval {
                cause: self.denial(e, "read").into_cause(),
            })?;

        let grants = self
            .repo
            .select_grants(&self.subject, self.scope)
            .await
            .map_err(CanopyError::into_retrieval)?;

        grants
            .into_iter()
            .map(P::from_grant)
            .collect::<CanopyResult<HashSet<P>>>()
            .map_err(|e| CanopyError::Retrieval {
                cause: FailureCause::Storage(e.to_string()),
            })
    }

    async fn add_permissions(&self, permissions: HashSet<P>) -> CanopyResult<()> {
        if permissions.is_empty() {
            return Ok(());
        }

        let grants = self
            .prepare_mutation(&permissions)
            .await
            .map_err(|e| CanopyError::Mutation {
                cause: self.denial(e, "add").into_cause(),
            })?;

        self.repo
            .insert_grants(&self.subject, self.scope, &grants)
            .await
            .map_err(CanopyError::into_mutation)?;

        info!(
            actor = %self.actor,
            subject = %self.subject,
            scope = %self.scope,
            count = grants.len(),
            "Permissions granted"
        );
        Ok(())
    }

    async fn remove_permissions(&self, permissions: HashSet<P>) -> CanopyResult<()> {
        if permissions.is_empty() {
            return Ok(());
        }

        let grants = self
            .prepare_mutation(&permissions)
            .await
            .map_err(|e| CanopyError::Mutation {
                cause: self.denial(e, "remove").into_cause(),
            })?;

        self.repo
            .delete_grants(&self.subject, self.scope, &grants)
            .await
            .map_err(CanopyError::into_mutation)?;

        info!(
            actor = %self.actor,
            subject = %self.subject,
            scope = %self.scope,
            count = grants.len(),
            "Permissions revoked"
        );
        Ok(())
    }
}
