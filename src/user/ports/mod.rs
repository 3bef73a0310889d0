//! Ports for user persistence and password hashing.

mod hasher;
mod repository;

pub use hasher::{PasswordHashError, PasswordHasher};
pub use repository::{UserRepository, UserRepositoryError, UserRepositoryResult};
