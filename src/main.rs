//! Taskboard HTTP server.
//!
//! Reads configuration from the environment (and `.env` when present),
//! prepares storage, and serves the API until SIGINT or SIGTERM.

use std::sync::Arc;

use taskboard::config::{AppConfig, StorageMode};
use taskboard::http::{self, AppState};
use taskboard::storage::{self, StorageError};
use taskboard::task::adapters::postgres::PostgresTaskRepository;
use taskboard::telemetry;
use taskboard::user::adapters::{Argon2PasswordHasher, postgres::PostgresUserRepository};
use taskboard::user::ports::PasswordHashError;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::signal;

#[derive(Debug, Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] taskboard::config::ConfigError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    PasswordHash(#[from] PasswordHashError),
    #[error("postgres storage selected without database settings")]
    MissingDatabase,
    #[error("server I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() {
    let dotenv = dotenvy::dotenv();
    if let Err(error) = telemetry::init() {
        tracing::warn!(%error, "tracing subscriber already installed");
    }
    if let Err(error) = dotenv
        && !error.not_found()
    {
        tracing::warn!(%error, "failed to read .env file");
    }

    if let Err(error) = run().await {
        tracing::error!(%error, "taskboard stopped");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), StartupError> {
    let config = AppConfig::from_env()?;
    tracing::info!(storage_mode = ?config.storage_mode, "configuration loaded");

    let state = build_state(&config).await?;
    let address = config.socket_addr()?;
    let listener = TcpListener::bind(address).await?;
    match listener.local_addr() {
        Ok(bound) => tracing::info!("listening on {bound}"),
        Err(error) => tracing::warn!(%error, "could not determine local address"),
    }

    axum::serve(listener, http::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server shutdown complete");
    Ok(())
}

async fn build_state(config: &AppConfig) -> Result<AppState, StartupError> {
    let hasher = Arc::new(Argon2PasswordHasher::new(
        config.password_hash.memory_kib,
        config.password_hash.iterations,
    )?);
    match config.storage_mode {
        StorageMode::InMemory => Ok(AppState::in_memory(hasher)),
        StorageMode::Postgres => {
            let database = config
                .database
                .as_ref()
                .ok_or(StartupError::MissingDatabase)?;
            let pool = storage::connect(database).await?;
            storage::bootstrap_schema(&pool).await?;
            Ok(AppState::new(
                Arc::new(PostgresTaskRepository::new(pool.clone())),
                Arc::new(PostgresUserRepository::new(pool)),
                hasher,
            ))
        }
    }
}

/// Completes on Ctrl+C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::warn!(%error, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::warn!(%error, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
