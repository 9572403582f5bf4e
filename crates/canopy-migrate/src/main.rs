//! Canopy Migrate — applies pending schema migrations to SurrealDB.
//!
//! Connection settings come from `CANOPY_DB_*` environment variables;
//! log verbosity from `RUST_LOG`.

use std::process::ExitCode;

use canopy_db::{DbConfig, DbManager};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let config = DbConfig::from_env();

    let manager = match DbManager::connect(&config).await {
        Ok(manager) => manager,
        Err(e) => {
            tracing::error!(error = %e, url = %config.url, "Failed to connect to SurrealDB");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = canopy_db::run_migrations(manager.client()).await {
        tracing::error!(error = %e, "Migration failed");
        return ExitCode::FAILURE;
    }

    tracing::info!(
        namespace = %config.namespace,
        database = %config.database,
        "Schema is up to date"
    );
    ExitCode::SUCCESS
}
