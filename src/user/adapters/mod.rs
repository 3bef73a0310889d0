//! Adapter implementations for the user ports.

pub mod argon2id;
pub mod memory;
pub mod postgres;

pub use argon2id::Argon2PasswordHasher;
pub use memory::InMemoryUserRepository;
