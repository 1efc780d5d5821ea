use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use todo_server::task::{Actor, SeaOrmTaskStore, TaskStore};
use todo_server::web::create_app;
use tower::ServiceExt;

mod common;

use common::TestResponse;

async fn setup() -> (Router, SeaOrmTaskStore) {
    let (task_state, store) = common::setup_task_state()
        .await
        .expect("Failed to setup test context");
    (create_app(common::setup_auth_state(), task_state), store)
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = TestResponse::from_response(app.clone().oneshot(request).await.unwrap()).await;
    let body = serde_json::from_str(&response.body).unwrap_or(Value::Null);
    (response.status, body)
}

async fn login(app: &Router, username: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/v1/login",
            None,
            json!({ "username": username, "password": password }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn can_reject_invalid_api_credentials() {
    let (app, _store) = setup().await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/login",
            None,
            json!({ "username": "alice", "password": "nope" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn can_require_authentication_for_tasks() {
    let (app, _store) = setup().await;

    let (status, body) = send(
        &app,
        json_request("POST", "/api/v1/tasks", None, json!({ "title": "Buy milk" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHORIZED");
}

#[tokio::test]
async fn can_list_placeholder_for_new_user() {
    let (app, _store) = setup().await;
    let token = login(&app, "alice", "wonderland").await;

    let request = Request::builder()
        .uri("/api/v1/tasks")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["header"], json!(["Task", "Complete"]));
    assert_eq!(
        body["rows"],
        json!([{ "kind": "empty", "message": "There are no tasks yet." }])
    );
}

#[tokio::test]
async fn can_add_task_through_api() {
    let (app, store) = setup().await;
    let token = login(&app, "alice", "wonderland").await;

    let (status, delta) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/tasks",
            Some(&token),
            json!({ "title": "Buy milk" }),
        ),
    )
    .await;

    let tasks = store.load_all_by_owner(&Actor::new("alice")).await.unwrap();
    assert_eq!(tasks.len(), 1);
    let task_id = tasks[0].id();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        delta,
        json!({
            "rerenderedList": {
                "header": ["Task", "Complete"],
                "rows": [{
                    "kind": "task",
                    "rowId": format!("todo-{}", task_id),
                    "checkbox": { "label": "Buy milk", "checked": false },
                    "action": { "taskId": task_id.value(), "name": format!("todo-{}", task_id) }
                }]
            },
            "notice": { "level": "status", "message": "Task added" },
            "controlBindings": [{
                "selector": format!("#todo-{}", task_id),
                "event": "click",
                "url": "/api/v1/tasks/complete",
                "taskId": task_id.value()
            }]
        })
    );
}

#[tokio::test]
async fn can_complete_only_own_task_through_api() {
    let (app, store) = setup().await;
    let task_id = store.create(&Actor::new("alice"), "Buy milk").await.unwrap();
    let bob_token = login(&app, "bob", "builder").await;
    let alice_token = login(&app, "alice", "wonderland").await;

    let (status, delta) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/tasks/complete",
            Some(&bob_token),
            json!({ "taskId": task_id.value() }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(delta, json!({}));
    assert!(store.load(task_id).await.unwrap().is_some());

    let (status, delta) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/tasks/complete",
            Some(&alice_token),
            json!({ "taskId": task_id.value() }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        delta,
        json!({
            "removedRowId": format!("todo-{}", task_id),
            "notice": { "level": "status", "message": "Item updated" }
        })
    );
    assert_eq!(store.load(task_id).await.unwrap(), None);
}

#[tokio::test]
async fn can_serve_openapi_document() {
    let (app, _store) = setup().await;

    let request = Request::builder()
        .uri("/api-docs/openapi.json")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/v1/tasks"].is_object());
    assert!(body["paths"]["/api/v1/tasks/complete"].is_object());
}
