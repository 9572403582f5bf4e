//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Grouped objects (single-parent hierarchy; NONE parent = under root)
-- =======================================================================
DEFINE TABLE grouped_object SCHEMAFULL;
DEFINE FIELD name ON TABLE grouped_object TYPE string;
DEFINE FIELD object_type ON TABLE grouped_object TYPE string \
    ASSERT $value IN ['Connection', 'ConnectionGroup', 'UserGroup'];
DEFINE FIELD parent_id ON TABLE grouped_object TYPE option<string>;
DEFINE FIELD created_at ON TABLE grouped_object TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE grouped_object TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_grouped_object_parent ON TABLE grouped_object \
    COLUMNS parent_id;

-- =======================================================================
-- Permission grants (one record per subject/scope/permission/target)
-- =======================================================================
DEFINE TABLE permission_grant SCHEMAFULL;
DEFINE FIELD subject_type ON TABLE permission_grant TYPE string \
    ASSERT $value IN ['user', 'user_group'];
DEFINE FIELD subject_id ON TABLE permission_grant TYPE string;
DEFINE FIELD scope ON TABLE permission_grant TYPE string \
    ASSERT $value IN ['system', 'connection', 'connection_group', \
    'user_group'];
DEFINE FIELD permission ON TABLE permission_grant TYPE string \
    ASSERT string::len($value) > 0;
DEFINE FIELD target ON TABLE permission_grant TYPE option<string>;
DEFINE FIELD created_at ON TABLE permission_grant TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_grant_subject_scope ON TABLE permission_grant \
    COLUMNS subject_type, subject_id, scope;
DEFINE INDEX idx_grant_unique ON TABLE permission_grant \
    COLUMNS subject_type, subject_id, scope, permission, target UNIQUE;
DEFINE INDEX idx_grant_target ON TABLE permission_grant \
    COLUMNS target;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_v1_defines_both_tables() {
        assert!(SCHEMA_V1.contains("DEFINE TABLE grouped_object"));
        assert!(SCHEMA_V1.contains("DEFINE TABLE permission_grant"));
    }

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(
                window[0].version < window[1].version,
                "Migrations must be in ascending version order"
            );
        }
    }
}
