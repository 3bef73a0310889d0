//! Service layer for user registration, listing, and authentication.

use crate::user::{
    domain::{EmailAddress, PlainPassword, User, UserDomainError, UserName},
    ports::{PasswordHashError, PasswordHasher, UserRepository, UserRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::spawn_blocking;
use tracing::{info, warn};

/// Raw registration input.
#[derive(Clone, PartialEq, Eq)]
pub struct RegisterUserRequest {
    name: String,
    email: String,
    password: String,
}

impl RegisterUserRequest {
    /// Creates a registration request.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for RegisterUserRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterUserRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// All registered users with their count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDirectory {
    /// Users, oldest first.
    pub users: Vec<User>,
    /// Number of registered users.
    pub total_users: usize,
}

/// Service-level errors for user operations.
#[derive(Debug, Error)]
pub enum UserRegistrationError {
    /// Input validation failed.
    #[error(transparent)]
    Domain(#[from] UserDomainError),
    /// Password hashing failed.
    #[error(transparent)]
    Hash(#[from] PasswordHashError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] UserRepositoryError),
    /// The blocking hashing task panicked or was cancelled.
    #[error("password hashing task failed: {0}")]
    HashTask(#[from] tokio::task::JoinError),
    /// Unknown email or wrong password.
    #[error("invalid email or password")]
    InvalidCredentials,
}

/// Result type for user service operations.
pub type UserRegistrationResult<T> = Result<T, UserRegistrationError>;

/// User registration orchestration service.
pub struct UserRegistrationService<U, H, C>
where
    U: UserRepository + ?Sized,
    H: PasswordHasher + ?Sized + 'static,
    C: Clock + Send + Sync,
{
    repository: Arc<U>,
    hasher: Arc<H>,
    clock: Arc<C>,
}

impl<U, H, C> Clone for UserRegistrationService<U, H, C>
where
    U: UserRepository + ?Sized,
    H: PasswordHasher + ?Sized + 'static,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            hasher: Arc::clone(&self.hasher),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<U, H, C> UserRegistrationService<U, H, C>
where
    U: UserRepository + ?Sized,
    H: PasswordHasher + ?Sized + 'static,
    C: Clock + Send + Sync,
{
    /// Creates a new registration service.
    #[must_use]
    pub const fn new(repository: Arc<U>, hasher: Arc<H>, clock: Arc<C>) -> Self {
        Self {
            repository,
            hasher,
            clock,
        }
    }

    /// Registers a new user.
    ///
    /// # Errors
    ///
    /// Returns [`UserRegistrationError::Domain`] for invalid input and
    /// [`UserRegistrationError::Repository`] with
    /// [`UserRepositoryError::DuplicateEmail`] when the address is taken.
    /// Hashing runs on a blocking thread; its failures surface as
    /// [`UserRegistrationError::Hash`] or [`UserRegistrationError::HashTask`].
    pub async fn register(&self, request: RegisterUserRequest) -> UserRegistrationResult<User> {
        let RegisterUserRequest {
            name,
            email,
            password,
        } = request;
        let user_name = UserName::new(name)?;
        let address = EmailAddress::new(email)?;
        let plain = PlainPassword::new(password)?;

        let hasher = Arc::clone(&self.hasher);
        let password_hash = spawn_blocking(move || hasher.hash(&plain)).await??;
        let user = User::register(user_name, address, password_hash, &*self.clock);
        self.repository.store(&user).await?;

        info!(user_id = %user.id(), "registered user");
        Ok(user)
    }

    /// Lists every registered user.
    ///
    /// # Errors
    ///
    /// Returns [`UserRegistrationError::Repository`] when the lookup fails.
    pub async fn list_users(&self) -> UserRegistrationResult<UserDirectory> {
        let users = self.repository.list().await?;
        let total_users = users.len();
        Ok(UserDirectory { users, total_users })
    }

    /// Checks an email and password pair.
    ///
    /// # Errors
    ///
    /// Returns [`UserRegistrationError::InvalidCredentials`] when the address
    /// is unknown or the password does not match.
    pub async fn authenticate(&self, email: &str, password: &str) -> UserRegistrationResult<User> {
        let Ok(address) = EmailAddress::new(email) else {
            return Err(UserRegistrationError::InvalidCredentials);
        };
        let Some(user) = self.repository.find_by_email(&address).await? else {
            warn!("authentication failed for unknown email");
            return Err(UserRegistrationError::InvalidCredentials);
        };

        let hasher = Arc::clone(&self.hasher);
        let candidate = password.to_owned();
        let stored = user.password_hash().clone();
        let matched = spawn_blocking(move || hasher.verify(&candidate, &stored)).await??;
        if matched {
            Ok(user)
        } else {
            warn!(user_id = %user.id(), "authentication failed");
            Err(UserRegistrationError::InvalidCredentials)
        }
    }
}
