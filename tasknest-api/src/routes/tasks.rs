/// Task endpoints
///
/// Every route here sits behind the bearer-token middleware and acts on the
/// caller's own tasks only. Tasks owned by other users answer 404.
///
/// # Endpoints
///
/// - `POST   /tasks` - create
/// - `GET    /tasks?title=&done=&limit=&offset=` - list one page
/// - `GET    /tasks/:id` - fetch
/// - `PUT    /tasks/:id` - partial update of `title` / `done`
/// - `DELETE /tasks/:id` - delete one
/// - `DELETE /tasks/all` - delete all of the caller's tasks

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tasknest_shared::{
    auth::middleware::AuthContext,
    models::{
        page::{Page, Pagination},
        task::{Task, TaskPatch},
    },
    usecase::{NewTaskInput, TaskQuery},
};
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};

/// Body of a successful create
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatedResponse {
    pub id: i64,
}

/// One page of tasks
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TaskPage {
    pub data: Vec<Task>,

    /// Matching tasks across all pages
    pub total: i64,

    /// Page size actually applied
    pub limit: i64,

    /// Offset actually applied
    pub offset: i64,
}

impl From<Page<Task>> for TaskPage {
    fn from(page: Page<Task>) -> Self {
        Self {
            data: page.data,
            total: page.total,
            limit: page.limit,
            offset: page.offset,
        }
    }
}

/// Listing query string
///
/// Values arrive as raw strings: `limit`/`offset` fall back to their
/// defaults when unusable, `done` must be `true` or `false`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListTasksQuery {
    /// Case-insensitive title substring
    pub title: Option<String>,

    /// `true` or `false`
    pub done: Option<String>,

    /// Page size, 1-100 (default 10)
    pub limit: Option<String>,

    /// Records to skip (default 0)
    pub offset: Option<String>,
}

impl ListTasksQuery {
    fn done_flag(&self) -> ApiResult<Option<bool>> {
        match self.done.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(v) if v.eq_ignore_ascii_case("true") => Ok(Some(true)),
            Some(v) if v.eq_ignore_ascii_case("false") => Ok(Some(false)),
            Some(other) => Err(ApiError::BadRequest(format!(
                "done must be true or false, got '{other}'"
            ))),
        }
    }
}

/// Create a task owned by the caller
#[utoipa::path(
    post,
    path = "/tasks",
    tag = "tasks",
    request_body = NewTaskInput,
    responses(
        (status = 201, description = "Task created", body = CreatedResponse),
        (status = 400, description = "Malformed JSON", body = crate::error::ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorResponse),
        (status = 422, description = "Blank title", body = crate::error::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<NewTaskInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    let Json(input) = payload?;

    let task = state.tasks.create_task(auth.user_id, input).await?;

    Ok((StatusCode::CREATED, Json(CreatedResponse { id: task.id })))
}

/// List the caller's tasks
#[utoipa::path(
    get,
    path = "/tasks",
    tag = "tasks",
    params(ListTasksQuery),
    responses(
        (status = 200, description = "One page of tasks", body = TaskPage),
        (status = 400, description = "Invalid done filter", body = crate::error::ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    query: Result<Query<ListTasksQuery>, QueryRejection>,
) -> ApiResult<Json<TaskPage>> {
    let Query(query) = query?;

    let pagination = Pagination::from_query(query.limit.as_deref(), query.offset.as_deref());
    let filter = TaskQuery {
        title: query.title.clone(),
        done: query.done_flag()?,
    };
    debug!(user_id = auth.user_id, ?filter, ?pagination, "Listing tasks");

    let page = state
        .tasks
        .list_tasks(auth.user_id, filter, pagination)
        .await?;

    Ok(Json(page.into()))
}

/// Fetch one task
#[utoipa::path(
    get,
    path = "/tasks/{id}",
    tag = "tasks",
    params(("id" = i64, Path, description = "Task id")),
    responses(
        (status = 200, description = "The task", body = Task),
        (status = 400, description = "Non-integer id", body = crate::error::ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorResponse),
        (status = 404, description = "No such task", body = crate::error::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Task>> {
    let Path(id) = id?;

    Ok(Json(state.tasks.get_task(auth.user_id, id).await?))
}

/// Update a task's title and/or completion flag
///
/// Fields absent from the body keep their stored values.
#[utoipa::path(
    put,
    path = "/tasks/{id}",
    tag = "tasks",
    params(("id" = i64, Path, description = "Task id")),
    request_body = TaskPatch,
    responses(
        (status = 200, description = "Updated task", body = Task),
        (status = 400, description = "Malformed JSON or id", body = crate::error::ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorResponse),
        (status = 404, description = "No such task", body = crate::error::ErrorResponse),
        (status = 422, description = "Blank title", body = crate::error::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<TaskPatch>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let Path(id) = id?;

    // A missing or foreign task answers 404 whatever the body holds
    state.tasks.get_task(auth.user_id, id).await?;
    let Json(patch) = payload?;

    Ok(Json(state.tasks.update_task(auth.user_id, id, patch).await?))
}

/// Delete one task
#[utoipa::path(
    delete,
    path = "/tasks/{id}",
    tag = "tasks",
    params(("id" = i64, Path, description = "Task id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "Non-integer id", body = crate::error::ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorResponse),
        (status = 404, description = "No such task", body = crate::error::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id?;

    state.tasks.delete_task(auth.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete every task the caller owns
#[utoipa::path(
    delete,
    path = "/tasks/all",
    tag = "tasks",
    responses(
        (status = 204, description = "All of the caller's tasks deleted"),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_all_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<StatusCode> {
    state.tasks.delete_all(auth.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
