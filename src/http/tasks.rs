//! Task endpoints.

use super::{
    dto::{
        CreateTaskBody, LabelsBody, ListTasksParams, TaskPageResponse, TaskResponse,
        UpdateTaskBody, label_names,
    },
    error::ApiErrorResponse,
    state::AppState,
};
use crate::task::{
    domain::TaskId,
    services::{CreateTaskRequest, UpdateTaskRequest},
};
use crate::user::domain::UserId;
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use uuid::Uuid;

type ApiResult<T> = Result<T, ApiErrorResponse>;

fn parse_task_id(raw: &str) -> ApiResult<TaskId> {
    Uuid::parse_str(raw.trim())
        .map(TaskId::from_uuid)
        .map_err(|_| {
            ApiErrorResponse::bad_request("INVALID_ID", format!("invalid task id: {raw}"))
        })
}

/// `GET /tasks`
pub async fn list_tasks(
    State(state): State<AppState>,
    params: Result<Query<ListTasksParams>, QueryRejection>,
) -> ApiResult<Json<TaskPageResponse>> {
    let Query(raw) = params?;
    let query = raw.into_query()?;
    let page = state.tasks.list_tasks(&query).await?;
    Ok(Json(TaskPageResponse::from(page)))
}

/// `GET /tasks/{id}`
pub async fn get_task(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<TaskResponse>> {
    let id = parse_task_id(&raw_id)?;
    let task = state
        .tasks
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiErrorResponse::not_found(format!("task not found: {id}")))?;
    Ok(Json(TaskResponse::from(&task)))
}

/// `POST /tasks`
pub async fn create_task(
    State(state): State<AppState>,
    body: Result<Json<CreateTaskBody>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    let Json(CreateTaskBody {
        title,
        description,
        status,
        user_id,
        labels,
    }) = body?;

    let mut request = CreateTaskRequest::new(title, description, UserId::from_uuid(user_id))
        .with_labels(labels.map(label_names).unwrap_or_default());
    if let Some(initial) = status {
        request = request.with_status(initial);
    }

    let task = state.tasks.create_task(request).await?;
    Ok((StatusCode::CREATED, Json(TaskResponse::from(&task))))
}

/// `PATCH /tasks/{id}`
pub async fn update_task(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Result<Json<UpdateTaskBody>, JsonRejection>,
) -> ApiResult<Json<TaskResponse>> {
    let id = parse_task_id(&raw_id)?;
    let Json(UpdateTaskBody {
        title,
        description,
        status,
        user_id,
        labels,
    }) = body?;

    let mut request = UpdateTaskRequest::new();
    if let Some(new_title) = title {
        request = request.with_title(new_title);
    }
    if let Some(new_description) = description {
        request = request.with_description(new_description);
    }
    if let Some(requested) = status {
        request = request.with_status(requested);
    }
    if let Some(owner) = user_id {
        request = request.with_owner(UserId::from_uuid(owner));
    }
    if let Some(desired) = labels {
        request = request.with_labels(label_names(desired));
    }

    let task = state.tasks.update_task(id, request).await?;
    Ok(Json(TaskResponse::from(&task)))
}

/// `POST /tasks/{id}/labels`
pub async fn add_labels(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Result<Json<LabelsBody>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    let id = parse_task_id(&raw_id)?;
    let Json(labels) = body?;
    let task = state.tasks.add_labels(id, labels.into_names()).await?;
    Ok((StatusCode::CREATED, Json(TaskResponse::from(&task))))
}

/// `DELETE /tasks/{id}/labels`
pub async fn remove_labels(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Result<Json<LabelsBody>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let id = parse_task_id(&raw_id)?;
    let Json(labels) = body?;
    state.tasks.remove_labels(id, labels.into_names()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /tasks/{id}`
pub async fn delete_task(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_task_id(&raw_id)?;
    state.tasks.delete_task(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
