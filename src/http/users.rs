//! Registration, login, and user listing endpoints.

use super::{
    dto::{LoginBody, RegisterBody, UserDirectoryResponse, UserResponse},
    error::ApiErrorResponse,
    state::AppState,
};
use crate::user::services::RegisterUserRequest;
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};

/// `POST /auth`
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterBody>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), ApiErrorResponse> {
    let Json(RegisterBody {
        name,
        email,
        password,
    }) = body?;
    let user = state
        .users
        .register(RegisterUserRequest::new(name, email, password))
        .await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// `POST /auth/login`
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginBody>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiErrorResponse> {
    let Json(LoginBody { email, password }) = body?;
    let user = state.users.authenticate(&email, &password).await?;
    Ok(Json(UserResponse::from(&user)))
}

/// `GET /users`
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<UserDirectoryResponse>, ApiErrorResponse> {
    let directory = state.users.list_users().await?;

    let mut users = Vec::with_capacity(directory.users.len());
    for user in &directory.users {
        let owned = state.tasks.find_by_owner(user.id()).await?;
        let mut response = UserResponse::from(user);
        response.task_ids = Some(owned.iter().map(|task| task.id().into_inner()).collect());
        users.push(response);
    }

    Ok(Json(UserDirectoryResponse {
        users,
        total_users: directory.total_users,
    }))
}
