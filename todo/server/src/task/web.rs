//! htmx surface of the TODO list.
//!
//! Mutations answer with a [`PageDelta`] rendered as an htmx response: the
//! body replaces the task table, `HX-Retarget`/`HX-Reswap` remove a row, and
//! notices are swapped out-of-band into `#todo-messages`.

use askama::Template;
use axum::{
    Form, Router,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::task::{
    Actor, ListController, ListRow, ListView, Notice, NoticeLevel, PageDelta, TaskId, TaskStore,
    TaskStoreError,
};

pub const COMPLETE_URL: &str = "/todo/complete";
/// Event name carrying the control bindings of re-rendered rows.
pub const BINDINGS_EVENT: &str = "todo:bindings";

#[derive(Debug, Deserialize)]
pub struct AddTaskForm {
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
pub struct CompleteTaskForm {
    task_id: TaskId,
}

#[derive(Clone)]
pub struct TaskState {
    pub store: Arc<dyn TaskStore>,
}

/// Custom error type for task handler operations.
#[derive(Debug, thiserror::Error)]
pub enum TodoError {
    /// Represents an error during template rendering.
    #[error("Template rendering failed")]
    Template(#[from] askama::Error),
    /// Represents a task store error.
    #[error("Task store error")]
    Store(#[from] TaskStoreError),
    #[error("Failed to encode control bindings")]
    Bindings(#[from] serde_json::Error),
    #[error("Invalid header value")]
    Header(#[from] axum::http::header::InvalidHeaderValue),
}

impl IntoResponse for TodoError {
    fn into_response(self) -> Response {
        tracing::error!("Task request failed: {}", self);
        let user_facing_error_message =
            "An unexpected error occurred while processing your request. Please try again later.";

        let error_template = ErrorMessageTemplate {
            message: user_facing_error_message,
        };
        let Ok(rendered) = error_template.render() else {
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        };

        let mut response = (StatusCode::INTERNAL_SERVER_ERROR, Html(rendered)).into_response();
        let headers = response.headers_mut();
        headers.insert(
            HeaderName::from_static("hx-retarget"),
            HeaderValue::from_static("#todo-messages"),
        );
        headers.insert(
            HeaderName::from_static("hx-reswap"),
            HeaderValue::from_static("innerHTML"),
        );
        response
    }
}

#[derive(Template)]
#[template(path = "todo.html")]
struct TodoPageTemplate<'a> {
    username: &'a str,
    list: ListView,
}

#[derive(Template)]
#[template(path = "todo/task_table.html")]
pub struct TaskTableTemplate<'a> {
    list: &'a ListView,
}

impl<'a> TaskTableTemplate<'a> {
    pub fn new(list: &'a ListView) -> Self {
        Self { list }
    }
}

#[derive(Template)]
#[template(path = "todo/notice.html")]
struct NoticeTemplate<'a> {
    level: &'a str,
    message: &'a str,
}

impl<'a> NoticeTemplate<'a> {
    fn new(notice: &'a Notice) -> Self {
        let level = match notice.level {
            NoticeLevel::Status => "status",
            NoticeLevel::Error => "error",
        };
        Self {
            level,
            message: &notice.message,
        }
    }
}

#[derive(Template)]
#[template(path = "todo/error_message.html")]
struct ErrorMessageTemplate<'a> {
    message: &'a str,
}

fn is_htmx_request(headers: &HeaderMap) -> bool {
    headers.contains_key("hx-request")
}

/// Turns a [`PageDelta`] into the htmx response applying it in place.
pub fn render_delta(delta: &PageDelta) -> Result<Response, TodoError> {
    let mut body = String::new();
    if let Some(list) = &delta.rerendered_list {
        body.push_str(&TaskTableTemplate::new(list).render()?);
    }
    if let Some(notice) = &delta.notice {
        body.push_str(&NoticeTemplate::new(notice).render()?);
    }

    let mut headers = HeaderMap::new();
    match (&delta.rerendered_list, &delta.removed_row_id) {
        (_, Some(row_id)) => {
            headers.insert(
                HeaderName::from_static("hx-retarget"),
                HeaderValue::try_from(format!("#{}", row_id))?,
            );
            headers.insert(
                HeaderName::from_static("hx-reswap"),
                HeaderValue::from_static("delete"),
            );
        }
        (Some(_), None) => {}
        (None, None) => {
            headers.insert(
                HeaderName::from_static("hx-reswap"),
                HeaderValue::from_static("none"),
            );
        }
    }
    if !delta.control_bindings.is_empty() {
        let trigger = serde_json::to_string(&HashMap::from([(
            BINDINGS_EVENT,
            &delta.control_bindings,
        )]))?;
        headers.insert(
            HeaderName::from_static("hx-trigger"),
            HeaderValue::try_from(trigger)?,
        );
    }

    let mut response = Html(body).into_response();
    response.headers_mut().extend(headers);
    Ok(response)
}

/// Answers htmx requests with the rendered delta and plain form posts with a redirect.
fn respond(headers: &HeaderMap, delta: &PageDelta) -> Result<Response, TodoError> {
    if is_htmx_request(headers) {
        render_delta(delta)
    } else {
        Ok(Redirect::to("/todo").into_response())
    }
}

/// Handler for GET /todo that displays the current user's task list.
#[tracing::instrument(skip(state))]
async fn todo_page_handler(
    State(state): State<Arc<TaskState>>,
    actor: Actor,
) -> Result<Html<String>, TodoError> {
    let controller = ListController::new(state.store.as_ref(), COMPLETE_URL);
    let list = controller.list(&actor).await?;
    let template = TodoPageTemplate {
        username: actor.as_str(),
        list,
    };
    Ok(Html(template.render()?))
}

/// Handler for GET /todo/table that returns just the task table fragment.
#[tracing::instrument(skip(state))]
async fn task_table_handler(
    State(state): State<Arc<TaskState>>,
    actor: Actor,
) -> Result<Html<String>, TodoError> {
    let controller = ListController::new(state.store.as_ref(), COMPLETE_URL);
    let list = controller.list(&actor).await?;
    Ok(Html(TaskTableTemplate::new(&list).render()?))
}

/// Handler for POST /todo/add.
#[tracing::instrument(skip(state, headers))]
async fn add_task_handler(
    State(state): State<Arc<TaskState>>,
    actor: Actor,
    headers: HeaderMap,
    Form(form): Form<AddTaskForm>,
) -> Result<Response, TodoError> {
    let controller = ListController::new(state.store.as_ref(), COMPLETE_URL);
    let delta = controller.add_task(&actor, &form.title).await;
    respond(&headers, &delta)
}

/// Handler for POST /todo/complete.
#[tracing::instrument(skip(state, headers))]
async fn complete_task_handler(
    State(state): State<Arc<TaskState>>,
    actor: Actor,
    headers: HeaderMap,
    Form(form): Form<CompleteTaskForm>,
) -> Result<Response, TodoError> {
    let controller = ListController::new(state.store.as_ref(), COMPLETE_URL);
    let delta = controller.complete_task(&actor, form.task_id).await;
    respond(&headers, &delta)
}

/// Creates and returns the todo router with all task-related routes.
pub fn create_todo_router(state: Arc<TaskState>) -> Router {
    Router::new()
        .route("/todo", get(todo_page_handler))
        .route("/todo/table", get(task_table_handler))
        .route("/todo/add", post(add_task_handler))
        .route(COMPLETE_URL, post(complete_task_handler))
        .with_state(state)
}
