//! `PostgreSQL` pool construction and schema bootstrap.

use crate::config::DatabaseConfig;
use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use thiserror::Error;
use tracing::info;

/// `PostgreSQL` connection pool shared by the repository adapters.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Schema applied at startup. Every statement is idempotent.
const SCHEMA_SQL: &str = include_str!("../migrations/2026-01-01-000000_create_taskboard/up.sql");

/// Errors raised while preparing storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The pool could not be built or a connection could not be checked out.
    #[error("connection pool error: {0}")]
    Pool(#[from] PoolError),

    /// Applying the schema failed.
    #[error("schema bootstrap failed: {0}")]
    Schema(#[from] diesel::result::Error),

    /// The blocking task panicked or was cancelled.
    #[error("storage task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Builds a connection pool, establishing the initial connections.
///
/// # Errors
///
/// Returns [`StorageError::Pool`] when the database is unreachable.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, StorageError> {
    let manager = ConnectionManager::<PgConnection>::new(config.url.clone());
    let pool_size = config.pool_size.max(1);
    let pool = tokio::task::spawn_blocking(move || {
        Pool::builder().max_size(pool_size).build(manager)
    })
    .await??;
    info!(pool_size, "connected to PostgreSQL");
    Ok(pool)
}

/// Creates the `users`, `tasks`, and `task_labels` tables when absent.
///
/// # Errors
///
/// Returns [`StorageError`] when no connection is available or a statement
/// fails.
pub async fn bootstrap_schema(pool: &PgPool) -> Result<(), StorageError> {
    let shared = pool.clone();
    tokio::task::spawn_blocking(move || -> Result<(), StorageError> {
        let mut connection = shared.get()?;
        connection.batch_execute(SCHEMA_SQL)?;
        Ok(())
    })
    .await??;
    info!("database schema ready");
    Ok(())
}
