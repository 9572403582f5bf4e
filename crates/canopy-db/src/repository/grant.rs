//! SurrealDB implementation of [`GrantRepository`].
//!
//! Each grant is stored under a record key derived from everything that
//! identifies it, so inserting an existing grant rewrites the same record
//! and deleting a missing one touches nothing.

use std::collections::HashSet;

use canopy_core::error::CanopyResult;
use canopy_core::models::permission::{GrantRecord, PermissionScope};
use canopy_core::models::subject::GrantSubject;
use canopy_core::repository::GrantRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct GrantRow {
    permission: String,
    target: Option<String>,
}

/// A grant staged for an upsert, carrying its record key.
#[derive(Debug, SurrealValue)]
struct KeyedGrantRow {
    key: String,
    permission: String,
    target: Option<String>,
}

/// Record key of one grant.
///
/// Each component is written as `<byte length>:<value>` so that no two
/// distinct grants share a key, whatever characters their parts contain.
/// An absent target is written as `-`, which no length prefix can start.
fn grant_key(
    subject: &GrantSubject,
    scope: PermissionScope,
    grant: &GrantRecord,
) -> String {
    let mut key = String::new();
    for part in [
        subject.kind(),
        subject.identifier(),
        scope.as_str(),
        grant.permission.as_str(),
    ] {
        push_component(&mut key, part);
    }
    match &grant.target {
        Some(target) => push_component(&mut key, target),
        None => key.push('-'),
    }
    key
}

fn push_component(key: &mut String, part: &str) {
    key.push_str(&part.len().to_string());
    key.push(':');
    key.push_str(part);
}

/// SurrealDB implementation of the grant repository.
#[derive(Clone)]
pub struct SurrealGrantRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealGrantRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> GrantRepository for SurrealGrantRepository<C> {
    async fn select_grants(
        &self,
        subject: &GrantSubject,
        scope: PermissionScope,
    ) -> CanopyResult<HashSet<GrantRecord>> {
        let mut result = self
            .db
            .query(
                "SELECT permission, target FROM permission_grant \
                 WHERE subject_type = $subject_type \
                 AND subject_id = $subject_id \
                 AND scope = $scope",
            )
            .bind(("subject_type", subject.kind()))
            .bind(("subject_id", subject.identifier().to_owned()))
            .bind(("scope", scope.as_str()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<GrantRow> = result.take(0).map_err(DbError::from)?;

        Ok(rows
            .into_iter()
            .map(|row| GrantRecord {
                permission: row.permission,
                target: row.target,
            })
            .collect())
    }

    async fn insert_grants(
        &self,
        subject: &GrantSubject,
        scope: PermissionScope,
        grants: &HashSet<GrantRecord>,
    ) -> CanopyResult<()> {
        if grants.is_empty() {
            return Ok(());
        }

        let staged: Vec<KeyedGrantRow> = grants
            .iter()
            .map(|grant| KeyedGrantRow {
                key: grant_key(subject, scope, grant),
                permission: grant.permission.clone(),
                target: grant.target.clone(),
            })
            .collect();

        debug!(%subject, %scope, count = staged.len(), "Upserting grants");

        self.db
            .query(
                "BEGIN TRANSACTION; \
                 FOR $grant IN $grants { \
                     UPSERT type::record('permission_grant', $grant.key) SET \
                         subject_type = $subject_type, \
                         subject_id = $subject_id, \
                         scope = $scope, \
                         permission = $grant.permission, \
                         target = $grant.target; \
                 }; \
                 COMMIT TRANSACTION;",
            )
            .bind(("grants", staged))
            .bind(("subject_type", subject.kind()))
            .bind(("subject_id", subject.identifier().to_owned()))
            .bind(("scope", scope.as_str()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(())
    }

    async fn delete_grants(
        &self,
        subject: &GrantSubject,
        scope: PermissionScope,
        grants: &HashSet<GrantRecord>,
    ) -> CanopyResult<()> {
        if grants.is_empty() {
            return Ok(());
        }

        let keys: Vec<String> = grants
            .iter()
            .map(|grant| grant_key(subject, scope, grant))
            .collect();

        debug!(%subject, %scope, count = keys.len(), "Deleting grants");

        self.db
            .query(
                "BEGIN TRANSACTION; \
                 FOR $key IN $keys { \
                     DELETE type::record('permission_grant', $key); \
                 }; \
                 COMMIT TRANSACTION;",
            )
            .bind(("keys", keys))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(())
    }
}
