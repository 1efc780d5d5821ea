use std::sync::Arc;

use crate::{
    auth::{self, AuthState},
    task::{self, web::TaskState},
};

use axum::{
    Json, Router,
    middleware::{from_fn, from_fn_with_state},
    routing::get,
};
use tower::ServiceBuilder;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::api::v1::json_login_handler,
        task::api::v1::get_tasks_handler,
        task::api::v1::add_task_handler,
        task::api::v1::complete_task_handler,
    ),
    tags(
        (name = "Auth", description = "Token issuance"),
        (name = "Tasks", description = "Per-user TODO list")
    )
)]
pub struct ApiDoc;

/// Creates the API routes for JSON API endpoints.
pub fn create_api_router(auth_state: Arc<AuthState>, task_state: Arc<TaskState>) -> Router {
    let login_router = auth::api::v1::create_api_router(auth_state.clone());
    let tasks_router = task::api::v1::create_api_router(task_state);
    let protected_routes = tasks_router
        .layer(ServiceBuilder::new().layer(from_fn(auth::api::v1::require_auth_middleware)));
    let public_routes = login_router;
    let api_routes = public_routes.merge(protected_routes);
    Router::new()
        .nest("/api/v1", api_routes)
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .layer(ServiceBuilder::new().layer(from_fn_with_state(
            auth_state,
            auth::api::v1::auth_user_middleware,
        )))
}
