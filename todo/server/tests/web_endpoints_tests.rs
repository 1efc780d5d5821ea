use axum::http::StatusCode;
use todo_server::auth::{AUTH_COOKIE, encode_jwt};
use todo_server::web::create_app;
use tower::ServiceExt;

mod common;

use common::{TestResponse, get_request};

async fn create_test_app() -> axum::Router {
    let (task_state, _store) = common::setup_task_state()
        .await
        .expect("Failed to setup test context");
    create_app(common::setup_auth_state(), task_state)
}

#[tokio::test]
async fn can_check_health_endpoint() {
    let app = create_test_app().await;

    let response = TestResponse::from_response(app.oneshot(get_request("/health")).await.unwrap()).await;

    assert_eq!(response.status, StatusCode::OK);
    insta::assert_snapshot!(response.body, @"OK");
}

#[tokio::test]
async fn can_render_welcome_page() {
    let app = create_test_app().await;

    let response = TestResponse::from_response(app.oneshot(get_request("/")).await.unwrap()).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains(r#"hx-get="/call-to-action""#));
    assert!(response.body.contains(r#"<script src="/static/todo.js" defer></script>"#));
}

#[tokio::test]
async fn can_render_call_to_action_for_unauthenticated_user() {
    let app = create_test_app().await;

    let response =
        TestResponse::from_response(app.oneshot(get_request("/call-to-action")).await.unwrap())
            .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains(r#"<a href="/login">Log in</a>"#));
}

#[tokio::test]
async fn can_redirect_anonymous_user_to_login() {
    let app = create_test_app().await;

    let response = TestResponse::from_response(app.oneshot(get_request("/todo")).await.unwrap()).await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), Some("/login"));
}

#[tokio::test]
async fn can_show_todo_page_to_logged_in_user() {
    let app = create_test_app().await;
    let token = encode_jwt("alice".to_string(), &common::test_config().jwt_secret).unwrap();

    let request = axum::http::Request::builder()
        .uri("/todo")
        .header("cookie", format!("{}={}", AUTH_COOKIE, token))
        .body(axum::body::Body::empty())
        .unwrap();
    let response = TestResponse::from_response(app.oneshot(request).await.unwrap()).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("<title>Todo for alice</title>"));
    assert!(response.body.contains("There are no tasks yet."));
}

#[tokio::test]
async fn can_serve_toggle_script() {
    let app = create_test_app().await;

    let response =
        TestResponse::from_response(app.oneshot(get_request("/static/todo.js")).await.unwrap())
            .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.header("content-type"),
        Some("application/javascript; charset=utf-8")
    );
    assert!(response.body.contains("\"selected\""));
}
