//! Translation of service errors into HTTP responses.

use crate::task::{
    domain::{ParseTaskStatusError, TaskDomainError, TaskQueryError},
    ports::TaskRepositoryError,
    services::TaskLifecycleError,
};
use crate::user::{
    ports::UserRepositoryError,
    services::UserRegistrationError,
};
use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;

const INTERNAL_MESSAGE: &str = "An internal error occurred";

/// JSON error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Error response: status code plus body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiErrorResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// Creates an error response.
    #[must_use]
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            error: ApiError {
                code: code.into(),
                message: message.into(),
            },
        }
    }

    /// 400 with the given code.
    #[must_use]
    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    /// 404.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    /// 409 with the given code.
    #[must_use]
    pub fn conflict(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, code, message)
    }

    /// 500. Details stay in the log.
    #[must_use]
    pub fn internal(source: &dyn std::error::Error) -> Self {
        error!(error = %source, "internal error");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            INTERNAL_MESSAGE,
        )
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<TaskDomainError> for ApiErrorResponse {
    fn from(error: TaskDomainError) -> Self {
        let code = match error {
            TaskDomainError::InvalidStatusTransition => "INVALID_STATUS_TRANSITION",
            _ => "VALIDATION_ERROR",
        };
        Self::bad_request(code, error.to_string())
    }
}

impl From<TaskQueryError> for ApiErrorResponse {
    fn from(error: TaskQueryError) -> Self {
        Self::bad_request("INVALID_QUERY", error.to_string())
    }
}

impl From<ParseTaskStatusError> for ApiErrorResponse {
    fn from(error: ParseTaskStatusError) -> Self {
        Self::bad_request("INVALID_QUERY", error.to_string())
    }
}

impl From<TaskRepositoryError> for ApiErrorResponse {
    fn from(error: TaskRepositoryError) -> Self {
        match error {
            TaskRepositoryError::NotFound(_) => Self::not_found(error.to_string()),
            TaskRepositoryError::DuplicateLabel(_) => {
                Self::conflict("DUPLICATE_LABEL", error.to_string())
            }
            TaskRepositoryError::DuplicateTask(_) => {
                Self::conflict("DUPLICATE_TASK", error.to_string())
            }
            TaskRepositoryError::Persistence(_) => Self::internal(&error),
        }
    }
}

impl From<UserRepositoryError> for ApiErrorResponse {
    fn from(error: UserRepositoryError) -> Self {
        match error {
            UserRepositoryError::DuplicateEmail(_) => {
                Self::conflict("DUPLICATE_EMAIL", error.to_string())
            }
            UserRepositoryError::DuplicateUser(_) => {
                Self::conflict("DUPLICATE_USER", error.to_string())
            }
            UserRepositoryError::Persistence(_) => Self::internal(&error),
        }
    }
}

impl From<TaskLifecycleError> for ApiErrorResponse {
    fn from(error: TaskLifecycleError) -> Self {
        match error {
            TaskLifecycleError::Domain(domain) => domain.into(),
            TaskLifecycleError::Repository(repository) => repository.into(),
            TaskLifecycleError::UserRepository(repository) => repository.into(),
            TaskLifecycleError::TaskNotFound(_) | TaskLifecycleError::OwnerNotFound(_) => {
                Self::not_found(error.to_string())
            }
        }
    }
}

impl From<UserRegistrationError> for ApiErrorResponse {
    fn from(error: UserRegistrationError) -> Self {
        match error {
            UserRegistrationError::Domain(domain) => {
                Self::bad_request("VALIDATION_ERROR", domain.to_string())
            }
            UserRegistrationError::Repository(repository) => repository.into(),
            UserRegistrationError::InvalidCredentials => Self::new(
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                error.to_string(),
            ),
            UserRegistrationError::Hash(_) | UserRegistrationError::HashTask(_) => {
                Self::internal(&error)
            }
        }
    }
}

impl From<JsonRejection> for ApiErrorResponse {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request("INVALID_BODY", rejection.body_text())
    }
}

impl From<QueryRejection> for ApiErrorResponse {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request("INVALID_QUERY", rejection.body_text())
    }
}
