//! Shared test helpers for in-memory integration tests.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use taskboard::{
    task::{adapters::memory::InMemoryTaskRepository, services::TaskLifecycleService},
    user::{
        adapters::{Argon2PasswordHasher, InMemoryUserRepository},
        domain::User,
        services::{RegisterUserRequest, UserRegistrationService},
    },
};

/// Task service wired to in-memory repositories.
pub type TestTaskService =
    TaskLifecycleService<InMemoryTaskRepository, InMemoryUserRepository, DefaultClock>;

/// User service sharing the task service's user repository.
pub type TestUserService =
    UserRegistrationService<InMemoryUserRepository, Argon2PasswordHasher, DefaultClock>;

/// Services wired against shared in-memory storage.
pub struct Board {
    pub tasks: TestTaskService,
    pub users: TestUserService,
    pub task_repository: Arc<InMemoryTaskRepository>,
}

impl Board {
    /// Registers a user with a valid password.
    ///
    /// # Errors
    ///
    /// Returns an error when registration fails.
    pub async fn register(&self, name: &str, email: &str) -> eyre::Result<User> {
        Ok(self
            .users
            .register(RegisterUserRequest::new(name, email, "Secret123"))
            .await?)
    }
}

/// Provides fresh services for each test.
#[fixture]
pub fn board() -> Board {
    let task_repository = Arc::new(InMemoryTaskRepository::new());
    let user_repository = Arc::new(InMemoryUserRepository::new());
    let clock = Arc::new(DefaultClock);

    Board {
        tasks: TaskLifecycleService::new(
            Arc::clone(&task_repository),
            Arc::clone(&user_repository),
            Arc::clone(&clock),
        ),
        users: UserRegistrationService::new(
            user_repository,
            Arc::new(Argon2PasswordHasher::new(8, 1).expect("minimum argon2 costs are valid")),
            clock,
        ),
        task_repository,
    }
}

/// Returns label names in stored order.
#[must_use]
pub fn label_names(task: &taskboard::task::domain::Task) -> Vec<String> {
    task.labels()
        .iter()
        .map(|label| label.name().as_str().to_owned())
        .collect()
}
