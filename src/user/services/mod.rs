//! Application services for user management.

mod registration;

pub use registration::{
    RegisterUserRequest, UserDirectory, UserRegistrationError, UserRegistrationResult,
    UserRegistrationService,
};
