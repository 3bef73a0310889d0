//! Shared handler state.

use crate::task::{
    adapters::memory::InMemoryTaskRepository, ports::TaskRepository,
    services::TaskLifecycleService,
};
use crate::user::{
    adapters::InMemoryUserRepository,
    ports::{PasswordHasher, UserRepository},
    services::UserRegistrationService,
};
use mockable::DefaultClock;
use std::sync::Arc;

/// Task service over runtime-selected adapters.
pub type TaskService = TaskLifecycleService<dyn TaskRepository, dyn UserRepository, DefaultClock>;

/// User service over runtime-selected adapters.
pub type UserService =
    UserRegistrationService<dyn UserRepository, dyn PasswordHasher, DefaultClock>;

/// Services available to every handler.
///
/// Repositories are trait objects so that the storage backend can be chosen
/// at startup.
#[derive(Clone)]
pub struct AppState {
    /// Task lifecycle operations.
    pub tasks: TaskService,
    /// User registration and lookup.
    pub users: UserService,
}

impl AppState {
    /// Wires services over the given adapters.
    #[must_use]
    pub fn new(
        task_repository: Arc<dyn TaskRepository>,
        user_repository: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        let clock = Arc::new(DefaultClock);
        Self {
            tasks: TaskLifecycleService::new(
                task_repository,
                Arc::clone(&user_repository),
                Arc::clone(&clock),
            ),
            users: UserRegistrationService::new(user_repository, hasher, clock),
        }
    }

    /// Wires services over fresh in-memory repositories.
    #[must_use]
    pub fn in_memory(hasher: Arc<dyn PasswordHasher>) -> Self {
        Self::new(
            Arc::new(InMemoryTaskRepository::new()),
            Arc::new(InMemoryUserRepository::new()),
            hasher,
        )
    }
}
