//! Error types for user domain validation.

use thiserror::Error;

/// Errors returned while constructing user domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserDomainError {
    /// The email address is malformed.
    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    /// The user name is shorter than allowed.
    #[error("user name must be at least {min} characters")]
    NameTooShort {
        /// Minimum accepted length in characters.
        min: usize,
    },

    /// The user name is longer than allowed.
    #[error("user name must be at most {max} characters")]
    NameTooLong {
        /// Maximum accepted length in characters.
        max: usize,
    },

    /// The password length is outside the accepted range.
    #[error("password must be between {min} and {max} characters")]
    PasswordLength {
        /// Minimum accepted length in characters.
        min: usize,
        /// Maximum accepted length in characters.
        max: usize,
    },

    /// The password lacks the required character classes.
    #[error("password is too weak")]
    WeakPassword,
}
