#![allow(dead_code)] // each test binary uses a different subset of these helpers

use axum::body::Body;
use axum::extract::Request;
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use migration::MigratorTrait;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use todo_server::auth::{AuthState, CurrentUser};
use todo_server::config::Config;
use todo_server::task::SeaOrmTaskStore;
use todo_server::task::web::TaskState;

/// Opens a fresh, migrated in-memory database.
pub async fn setup_db() -> anyhow::Result<DatabaseConnection> {
    // Allow multiple calls to init for tests.
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    // A single pooled connection, otherwise every connection sees its own empty database.
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

pub async fn setup_task_state() -> anyhow::Result<(Arc<TaskState>, SeaOrmTaskStore)> {
    let store = SeaOrmTaskStore::new(setup_db().await?);
    let state = Arc::new(TaskState {
        store: Arc::new(store.clone()),
    });
    Ok((state, store))
}

pub fn test_config() -> Config {
    Config {
        db_url: "".to_string(),
        port: 8080,
        jwt_secret: "some_secret".to_string(),
        users: HashMap::from([
            ("alice".to_string(), "wonderland".to_string()),
            ("bob".to_string(), "builder".to_string()),
        ]),
    }
}

pub fn setup_auth_state() -> Arc<AuthState> {
    Arc::new(AuthState::from_config(&test_config()))
}

type MiddlewareFuture = Pin<Box<dyn Future<Output = Response> + Send>>;

/// Middleware that pretends `username` is logged in.
pub fn create_stub_user_middleware(
    username: String,
) -> impl Fn(Request, Next) -> MiddlewareFuture + Clone + Send + Sync + 'static {
    move |mut request: Request, next: Next| {
        request
            .extensions_mut()
            .insert(CurrentUser::new(username.clone()));
        Box::pin(async move { next.run(request).await })
    }
}

/// The parts of a response tests look at.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub async fn from_response(response: Response) -> Self {
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        Self {
            status,
            headers,
            body: String::from_utf8(body.to_vec()).unwrap(),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

pub fn form_request(uri: &str, form: &str, htmx: bool) -> Request {
    let mut builder = axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded");
    if htmx {
        builder = builder.header("hx-request", "true");
    }
    builder.body(Body::from(form.to_string())).unwrap()
}

pub fn get_request(uri: &str) -> Request {
    axum::http::Request::builder()
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}
