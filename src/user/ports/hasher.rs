//! Port for one-way password hashing.

use crate::user::domain::{PasswordHash, PlainPassword};
use thiserror::Error;

/// Errors returned by password hashers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordHashError {
    /// A stored hash could not be decoded.
    #[error("malformed password hash: {0}")]
    Malformed(String),

    /// The configured cost parameters are out of range.
    #[error("invalid password hash parameters: {0}")]
    InvalidParameters(String),

    /// Deriving a new hash failed.
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// Salted one-way password hashing.
///
/// Implementations must never compare plaintext directly against stored
/// values. Both operations are CPU bound; async callers should run them on
/// a blocking thread.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a validated password with a fresh salt.
    ///
    /// # Errors
    ///
    /// Returns [`PasswordHashError`] when hashing fails.
    fn hash(&self, password: &PlainPassword) -> Result<PasswordHash, PasswordHashError>;

    /// Checks a candidate password against a stored hash.
    ///
    /// # Errors
    ///
    /// Returns [`PasswordHashError::Malformed`] when `hash` cannot be
    /// decoded.
    fn verify(&self, candidate: &str, hash: &PasswordHash) -> Result<bool, PasswordHashError>;
}
