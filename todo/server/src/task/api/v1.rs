use crate::auth::api::v1::ErrorResponse;
use crate::task::web::TaskState;
use crate::task::{Actor, ListController, ListView, PageDelta, TaskId};
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

pub const COMPLETE_URL: &str = "/api/v1/tasks/complete";

/// Request body for adding a task.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddTaskRequest {
    /// Title of the new task, stored verbatim
    #[serde(default)]
    title: String,
}

/// Request body for completing a task.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompleteTaskRequest {
    /// ID of the task to complete
    task_id: TaskId,
}

/// Handler for GET /api/v1/tasks - Returns the caller's task list.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/v1/tasks",
    responses(
        (status = 200, description = "The caller's task list", body = ListView),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn get_tasks_handler(
    State(state): State<Arc<TaskState>>,
    actor: Actor,
) -> Result<Json<ListView>, (StatusCode, Json<ErrorResponse>)> {
    let controller = ListController::new(state.store.as_ref(), COMPLETE_URL);

    controller.list(&actor).await.map(Json).map_err(|err| {
        tracing::error!("Failed to get tasks: {}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(
                "INTERNAL_ERROR",
                "Failed to retrieve tasks",
            )),
        )
    })
}

/// Handler for POST /api/v1/tasks - Adds a task and returns the page delta.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/api/v1/tasks",
    request_body = AddTaskRequest,
    responses(
        (status = 200, description = "Page delta describing the outcome", body = PageDelta),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn add_task_handler(
    State(state): State<Arc<TaskState>>,
    actor: Actor,
    Json(request): Json<AddTaskRequest>,
) -> Json<PageDelta> {
    let controller = ListController::new(state.store.as_ref(), COMPLETE_URL);
    Json(controller.add_task(&actor, &request.title).await)
}

/// Handler for POST /api/v1/tasks/complete - Completes a task and returns the page delta.
///
/// Tasks the caller does not own produce an empty delta.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/api/v1/tasks/complete",
    request_body = CompleteTaskRequest,
    responses(
        (status = 200, description = "Page delta describing the outcome", body = PageDelta),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn complete_task_handler(
    State(state): State<Arc<TaskState>>,
    actor: Actor,
    Json(request): Json<CompleteTaskRequest>,
) -> Json<PageDelta> {
    let controller = ListController::new(state.store.as_ref(), COMPLETE_URL);
    Json(controller.complete_task(&actor, request.task_id).await)
}

/// Creates and returns the tasks API router.
pub fn create_api_router(state: Arc<TaskState>) -> Router {
    Router::new()
        .route("/tasks", get(get_tasks_handler).post(add_task_handler))
        .route("/tasks/complete", post(complete_task_handler))
        .with_state(state)
}
