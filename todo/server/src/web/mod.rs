use askama::Template;
use axum::Router;
use axum::extract::Extension;
use axum::http::{HeaderName, StatusCode, header};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::response::{Html, IntoResponse};
use migration::MigratorTrait;
use sea_orm::Database;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{
    AuthState, CurrentUser, auth_user_middleware, create_login_router, login_redirect_middleware,
};
use crate::config::Config;
use crate::task::SeaOrmTaskStore;
use crate::task::web::{TaskState, create_todo_router};

pub mod api;

/// Checkbox toggle behaviour for the task table.
const TODO_SCRIPT: &str = include_str!("../../static/todo.js");

/// Custom error type for web handler operations.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// Represents an error during template rendering.
    #[error("Template rendering failed")]
    Template(#[from] askama::Error),
}

impl IntoResponse for WebError {
    fn into_response(self) -> axum::response::Response {
        tracing::error!("Web request failed: {}", self);
        let user_facing_error_message =
            "An unexpected error occurred while processing your request. Please try again later.";
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(format!(
                "<h1>Internal Server Error</h1><p>{}</p>",
                user_facing_error_message
            )),
        )
            .into_response()
    }
}

/// Assembles every route of the application around an already migrated task store.
pub fn create_app(auth_state: Arc<AuthState>, task_state: Arc<TaskState>) -> Router {
    let protected_routes = create_todo_router(task_state.clone()).layer(
        ServiceBuilder::new()
            .layer(from_fn_with_state(auth_state.clone(), auth_user_middleware))
            .layer(from_fn(login_redirect_middleware)),
    );

    let public_routes = Router::new()
        .route("/health", axum::routing::get(health_check_handler))
        .route("/", axum::routing::get(welcome_handler))
        .route(
            "/call-to-action",
            axum::routing::get(call_to_action_handler),
        )
        .route("/static/todo.js", axum::routing::get(todo_script_handler))
        .merge(create_login_router(auth_state.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(from_fn_with_state(auth_state.clone(), auth_user_middleware)),
        );

    Router::new()
        .merge(protected_routes)
        .merge(public_routes)
        .merge(api::create_api_router(auth_state, task_state))
        .layer(
            ServiceBuilder::new()
                .layer(SetSensitiveRequestHeadersLayer::new([
                    header::AUTHORIZATION,
                    header::COOKIE,
                ]))
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::new().expose_headers([
                    HeaderName::from_static("hx-retarget"),
                    HeaderName::from_static("hx-reswap"),
                    HeaderName::from_static("hx-trigger"),
                ])),
        )
}

#[tracing::instrument(skip(config))]
pub async fn start_web_server(config: Config) -> anyhow::Result<()> {
    let server_address = format!("0.0.0.0:{}", &config.port);
    let listener = tokio::net::TcpListener::bind(&server_address).await?;
    tracing::info!("Web server running on http://{}", server_address);

    let db = Database::connect(&config.db_url).await?;
    migration::Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied successfully");

    if config.users.is_empty() {
        tracing::warn!("No users configured; nobody will be able to log in");
    }

    let auth_state = Arc::new(AuthState::from_config(&config));
    let task_state = Arc::new(TaskState {
        store: Arc::new(SeaOrmTaskStore::new(db)),
    });

    axum::serve(listener, create_app(auth_state, task_state)).await?;
    Ok(())
}

#[tracing::instrument]
pub async fn health_check_handler() -> &'static str {
    "OK"
}

#[tracing::instrument]
pub async fn welcome_handler() -> Result<Html<String>, WebError> {
    let template = IndexTemplate::new();
    template.render().map(Html).map_err(WebError::from)
}

#[tracing::instrument]
pub async fn call_to_action_handler(
    current_user: Option<Extension<CurrentUser>>,
) -> Result<Html<String>, WebError> {
    let template = CallToActionTemplate::new(current_user.map(|Extension(user)| user.username));
    template.render().map(Html).map_err(WebError::from)
}

/// Serves the client-side checkbox toggle script.
pub async fn todo_script_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        TODO_SCRIPT,
    )
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate;

impl IndexTemplate {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Template)]
#[template(path = "welcome/call_to_action.html")]
struct CallToActionTemplate {
    username: Option<String>,
}

impl CallToActionTemplate {
    pub fn new(username: Option<String>) -> Self {
        Self { username }
    }
}
