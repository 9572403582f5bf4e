//! Access policy for viewing and altering permission sets.
//!
//! - A set may be viewed by the subject it belongs to (or a member of
//!   that group), or by a system administrator.
//! - A set may be altered by a system administrator, or, for object
//!   scopes, by an actor holding `ADMINISTER` on every object the batch
//!   touches.
//!
//! [`Actor::Unrestricted`] passes every check.

use std::collections::HashSet;

use canopy_core::models::permission::{
    GrantRecord, ObjectPermissionType, Permission, PermissionScope, SystemPermission,
};
use canopy_core::models::subject::GrantSubject;
use canopy_core::repository::GrantRepository;

use crate::actor::Actor;
use crate::error::AuthzError;

/// Evaluates access checks for one actor against the grant store.
pub struct AccessPolicy<'a, R: GrantRepository> {
    repo: &'a R,
    actor: &'a Actor,
}

impl<'a, R: GrantRepository> AccessPolicy<'a, R> {
    pub fn new(repo: &'a R, actor: &'a Actor) -> Self {
        Self { repo, actor }
    }

    /// Whether the actor, directly or through a group, holds system
    /// `ADMINISTER`.
    pub async fn is_system_administrator(&self) -> Result<bool, AuthzError> {
        if matches!(self.actor, Actor::Unrestricted) {
            return Ok(true);
        }

        let administer = SystemPermission::Administer.to_grant();
        for subject in self.actor.subjects() {
            let grants = self
                .repo
                .select_grants(&subject, PermissionScope::System)
                .await?;
            if grants.contains(&administer) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Identifiers of the objects in `scope` the actor holds `ADMINISTER` on.
    pub async fn administered_objects(
        &self,
        scope: PermissionScope,
    ) -> Result<HashSet<String>, AuthzError> {
        let mut administered = HashSet::new();
        if !scope.is_object() {
            return Ok(administered);
        }

        let administer = ObjectPermissionType::Administer.as_str();
        for subject in self.actor.subjects() {
            let grants = self.repo.select_grants(&subject, scope).await?;
            administered.extend(
                grants
                    .into_iter()
                    .filter(|grant| grant.permission == administer)
                    .filter_map(|grant| grant.target),
            );
        }
        Ok(administered)
    }

    /// Fails with [`AuthzError::Denied`] unless the actor may view the
    /// grants of `subject`.
    pub async fn check_read(&self, subject: &GrantSubject) -> Result<(), AuthzError> {
        if self.actor.represents(subject) || self.is_system_administrator().await? {
            return Ok(());
        }
        Err(AuthzError::Denied(format!(
            "{} may not view permissions of {subject}",
            self.actor
        )))
    }

    /// Fails with [`AuthzError::Denied`] unless the actor may add or
    /// remove `grants` in `scope`.
    pub async fn check_alter(
        &self,
        subject: &GrantSubject,
        scope: PermissionScope,
        grants: &HashSet<GrantRecord>,
    ) -> Result<(), AuthzError> {
        if self.is_system_administrator().await? {
            return Ok(());
        }

        if scope.is_object() {
            let administered = self.administered_objects(scope).await?;
            let covered = grants.iter().all(|grant| {
                grant
                    .target
                    .as_ref()
                    .is_some_and(|target| administered.contains(target))
            });
            if covered {
                return Ok(());
            }
        }

        Err(AuthzError::Denied(format!(
            "{} may not alter {scope} permissions of {subject}",
            self.actor
        )))
    }
}
