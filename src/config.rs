//! Environment-driven application configuration.
//!
//! # Environment Variables
//!
//! - `HOST`: bind address (default `0.0.0.0`)
//! - `PORT`: bind port (default `3000`)
//! - `STORAGE_MODE`: `in_memory` (default) | `postgres`
//! - `DATABASE_URL`: full `PostgreSQL` URL; when unset the URL is assembled
//!   from `DB_HOST` (default `localhost`), `DB_PORT` (default `5432`),
//!   `DB_USER`, `DB_PASSWORD`, and `DB_DATABASE`
//! - `DB_POOL_SIZE`: maximum pooled connections (default `8`)
//! - `PASSWORD_HASH_MEMORY_KIB`: Argon2id memory cost for new password
//!   hashes (default `19456`)
//! - `PASSWORD_HASH_ITERATIONS`: Argon2id passes for new password hashes
//!   (default `2`)

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DB_HOST: &str = "localhost";
const DEFAULT_DB_PORT: u16 = 5432;
const DEFAULT_POOL_SIZE: u32 = 8;
const DEFAULT_HASH_MEMORY_KIB: u32 = 19_456;
const DEFAULT_HASH_ITERATIONS: u32 = 2;

/// Errors raised while reading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// `STORAGE_MODE` holds an unknown value.
    #[error("invalid storage mode: {0}")]
    InvalidStorageMode(String),

    /// A numeric setting could not be parsed.
    #[error("invalid value for {key}: {value}")]
    InvalidNumber {
        /// Environment variable name.
        key: &'static str,
        /// Rejected value.
        value: String,
    },

    /// A database setting required for `postgres` storage is missing.
    #[error("missing database setting: {0}")]
    MissingDatabaseSetting(&'static str),

    /// `HOST` and `PORT` do not form a socket address.
    #[error("invalid server address: {0}")]
    InvalidAddress(String),
}

/// Backing store for repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageMode {
    /// Process-local storage; data is lost on restart.
    #[default]
    InMemory,
    /// `PostgreSQL` storage.
    Postgres,
}

impl FromStr for StorageMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "in_memory" | "inmemory" | "memory" => Ok(Self::InMemory),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            _ => Err(ConfigError::InvalidStorageMode(value.to_owned())),
        }
    }
}

/// Connection settings for `PostgreSQL` storage.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Connection URL.
    pub url: String,
    /// Maximum pooled connections.
    pub pool_size: u32,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"<redacted>")
            .field("pool_size", &self.pool_size)
            .finish()
    }
}

/// Cost settings for new password hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHashConfig {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Passes over memory.
    pub iterations: u32,
}

impl Default for PasswordHashConfig {
    fn default() -> Self {
        Self {
            memory_kib: DEFAULT_HASH_MEMORY_KIB,
            iterations: DEFAULT_HASH_ITERATIONS,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Repository backend.
    pub storage_mode: StorageMode,
    /// Database settings; present only for `postgres` storage.
    pub database: Option<DatabaseConfig>,
    /// Cost settings for new password hashes.
    pub password_hash: PasswordHashConfig,
}

impl AppConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a value is malformed or a required
    /// database setting is missing.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`.
    ///
    /// Blank values count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a value is malformed or a required
    /// database setting is missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let storage_mode = read("STORAGE_MODE")
            .map(|value| value.parse::<StorageMode>())
            .transpose()?
            .unwrap_or_default();

        let database = match storage_mode {
            StorageMode::InMemory => None,
            StorageMode::Postgres => Some(DatabaseConfig {
                url: database_url(&read)?,
                pool_size: parse_number(&read, "DB_POOL_SIZE", DEFAULT_POOL_SIZE)?,
            }),
        };

        Ok(Self {
            host: read("HOST").unwrap_or_else(|| DEFAULT_HOST.to_owned()),
            port: parse_number(&read, "PORT", DEFAULT_PORT)?,
            storage_mode,
            database,
            password_hash: PasswordHashConfig {
                memory_kib: parse_number(
                    &read,
                    "PASSWORD_HASH_MEMORY_KIB",
                    DEFAULT_HASH_MEMORY_KIB,
                )?,
                iterations: parse_number(
                    &read,
                    "PASSWORD_HASH_ITERATIONS",
                    DEFAULT_HASH_ITERATIONS,
                )?,
            },
        })
    }

    /// Returns the socket address to bind.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidAddress`] when `host:port` does not
    /// parse.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let address = format!("{}:{}", self.host, self.port);
        address
            .parse()
            .map_err(|_| ConfigError::InvalidAddress(address))
    }
}

fn parse_number<T, R>(read: &R, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    R: Fn(&str) -> Option<String>,
{
    read(key).map_or(Ok(default), |value| {
        value
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { key, value })
    })
}

fn database_url<R>(read: &R) -> Result<String, ConfigError>
where
    R: Fn(&str) -> Option<String>,
{
    if let Some(url) = read("DATABASE_URL") {
        return Ok(url);
    }

    let host = read("DB_HOST").unwrap_or_else(|| DEFAULT_DB_HOST.to_owned());
    let port: u16 = parse_number(read, "DB_PORT", DEFAULT_DB_PORT)?;
    let user = read("DB_USER").ok_or(ConfigError::MissingDatabaseSetting("DB_USER"))?;
    let database = read("DB_DATABASE").ok_or(ConfigError::MissingDatabaseSetting("DB_DATABASE"))?;
    let credentials = read("DB_PASSWORD")
        .map_or_else(|| user.clone(), |password| format!("{user}:{password}"));

    Ok(format!("postgres://{credentials}@{host}:{port}/{database}"))
}
