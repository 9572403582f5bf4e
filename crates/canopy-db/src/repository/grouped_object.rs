//! SurrealDB implementation of [`GroupedObjectRepository`].

use canopy_core::error::{CanopyError, CanopyResult};
use canopy_core::models::grouped_object::{CreateGroupedObject, GroupedObject, ObjectType};
use canopy_core::repository::GroupedObjectRepository;
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the identifier is already known.
#[derive(Debug, SurrealValue)]
struct GroupedObjectRow {
    name: String,
    object_type: String,
    parent_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct GroupedObjectRowWithId {
    record_id: String,
    name: String,
    object_type: String,
    parent_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl GroupedObjectRowWithId {
    fn try_into_grouped_object(self) -> Result<GroupedObject, DbError> {
        row_to_grouped_object(
            GroupedObjectRow {
                name: self.name,
                object_type: self.object_type,
                parent_id: self.parent_id,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
            self.record_id,
        )
    }
}

#[derive(Debug, SurrealValue)]
struct ParentRow {
    parent_id: Option<String>,
}

fn parse_object_type(s: &str) -> Result<ObjectType, DbError> {
    s.parse()
        .map_err(|_| DbError::Decode(format!("unknown object type: {s}")))
}

fn row_to_grouped_object(
    row: GroupedObjectRow,
    identifier: String,
) -> Result<GroupedObject, DbError> {
    Ok(GroupedObject {
        identifier,
        name: row.name,
        object_type: parse_object_type(&row.object_type)?,
        parent_identifier: row.parent_id,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn not_found(identifier: &str) -> DbError {
    DbError::NotFound {
        entity: "grouped_object".into(),
        id: identifier.to_owned(),
    }
}

/// SurrealDB implementation of the grouped object repository.
#[derive(Clone)]
pub struct SurrealGroupedObjectRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealGroupedObjectRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> GroupedObjectRepository for SurrealGroupedObjectRepository<C> {
    async fn create(&self, input: CreateGroupedObject) -> CanopyResult<GroupedObject> {
        let identifier = Uuid::new_v4().to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('grouped_object', $id) SET \
                 name = $name, object_type = $object_type, \
                 parent_id = $parent_id",
            )
            .bind(("id", identifier.clone()))
            .bind(("name", input.name))
            .bind(("object_type", input.object_type.as_str()))
            .bind(("parent_id", input.parent_identifier))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<GroupedObjectRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| not_found(&identifier))?;

        row_to_grouped_object(row, identifier).map_err(Into::into)
    }

    async fn get_by_id(&self, identifier: &str) -> CanopyResult<GroupedObject> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('grouped_object', $id)")
            .bind(("id", identifier.to_owned()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<GroupedObjectRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| not_found(identifier))?;

        row_to_grouped_object(row, identifier.to_owned()).map_err(Into::into)
    }

    async fn delete(&self, identifier: &str) -> CanopyResult<()> {
        if !self.get_children(Some(identifier)).await?.is_empty() {
            return Err(CanopyError::Validation {
                message: format!("grouped object {identifier} still has children"),
            });
        }

        // Grants on the object go with it. The THROW guards against a child
        // attached between the check above and the transaction.
        self.db
            .query(
                "BEGIN TRANSACTION; \
                 IF count((SELECT id FROM grouped_object WHERE parent_id = $id)) > 0 { \
                     THROW 'grouped object has children'; \
                 }; \
                 DELETE permission_grant WHERE target = $id; \
                 DELETE type::record('grouped_object', $id); \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", identifier.to_owned()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(())
    }

    async fn load_parent(&self, identifier: &str) -> CanopyResult<Option<String>> {
        let mut result = self
            .db
            .query("SELECT parent_id FROM type::record('grouped_object', $id)")
            .bind(("id", identifier.to_owned()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ParentRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| not_found(identifier))?;

        Ok(row.parent_id)
    }

    async fn save_parent(
        &self,
        identifier: &str,
        parent_identifier: Option<&str>,
    ) -> CanopyResult<()> {
        let result = self
            .db
            .query(
                "UPDATE type::record('grouped_object', $id) SET \
                 parent_id = $parent_id, updated_at = time::now()",
            )
            .bind(("id", identifier.to_owned()))
            .bind(("parent_id", parent_identifier.map(str::to_owned)))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        // UPDATE on a missing record yields no rows rather than an error.
        let rows: Vec<ParentRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(not_found(identifier).into());
        }

        Ok(())
    }

    async fn get_children(
        &self,
        parent_identifier: Option<&str>,
    ) -> CanopyResult<Vec<GroupedObject>> {
        let mut result = match parent_identifier {
            Some(parent) => self
                .db
                .query(
                    "SELECT meta::id(id) AS record_id, * FROM grouped_object \
                     WHERE parent_id = $parent_id \
                     ORDER BY name ASC",
                )
                .bind(("parent_id", parent.to_owned()))
                .await
                .map_err(DbError::from)?,
            None => self
                .db
                .query(
                    "SELECT meta::id(id) AS record_id, * FROM grouped_object \
                     WHERE parent_id IS NONE \
                     ORDER BY name ASC",
                )
                .await
                .map_err(DbError::from)?,
        };

        let rows: Vec<GroupedObjectRowWithId> = result.take(0).map_err(DbError::from)?;

        rows.into_iter()
            .map(|row| row.try_into_grouped_object())
            .collect::<Result<Vec<_>, DbError>>()
            .map_err(Into::into)
    }
}
