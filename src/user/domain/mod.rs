//! Domain model for registered users.

mod credentials;
mod error;
mod ids;
mod user;

pub use credentials::{EmailAddress, PasswordHash, PlainPassword};
pub use error::UserDomainError;
pub use ids::UserId;
pub use user::{PersistedUserData, User, UserName};
