use crate::auth::{AuthState, CurrentUser, IdentityProvider, decode_jwt, encode_jwt};
use axum::{
    Json, Router,
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// JSON request payload for API login
#[derive(Deserialize, Debug, ToSchema)]
pub struct JsonLoginRequest {
    pub username: String,
    pub password: String,
}

/// JSON response for successful API login
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct LoginResponse {
    pub token: String,
}

/// JSON response for API errors
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: &str, message: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
        }
    }
}

/// Creates a JSON API router for authentication endpoints.
pub fn create_api_router(state: Arc<AuthState>) -> Router<()> {
    Router::new()
        .route("/login", axum::routing::post(json_login_handler))
        .with_state(state)
}

/// API authentication middleware that extracts the current user from Authorization Bearer header.
pub async fn auth_user_middleware(
    State(state): State<Arc<AuthState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Response {
    let token = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    if let Some(token) = token {
        if let Ok(claims) = decode_jwt(token, &state.jwt_secret) {
            request
                .extensions_mut()
                .insert(CurrentUser::new(claims.username));
        }
    }

    next.run(request).await
}

/// Answers UNAUTHORIZED unless auth_user_middleware found a user.
pub async fn require_auth_middleware(request: Request, next: Next) -> Response {
    if request.extensions().current_actor().is_none() {
        let error_response = ErrorResponse::new(
            "UNAUTHORIZED",
            "Authentication required to access this resource",
        );
        return (StatusCode::UNAUTHORIZED, Json(error_response)).into_response();
    }

    next.run(request).await
}

/// Handler for POST /api/v1/login - Exchanges credentials for a JWT.
#[tracing::instrument(skip(state, payload), fields(username = %payload.username))]
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = JsonLoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn json_login_handler(
    State(state): State<Arc<AuthState>>,
    Json(payload): Json<JsonLoginRequest>,
) -> Result<Json<LoginResponse>, (StatusCode, Json<ErrorResponse>)> {
    if !state.verify(&payload.username, &payload.password) {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new(
                "INVALID_CREDENTIALS",
                "Invalid username or password",
            )),
        ));
    }

    let token = encode_jwt(payload.username.clone(), &state.jwt_secret).map_err(|err| {
        tracing::error!("Failed to encode JWT: {}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(
                "JWT_ERROR",
                "Failed to generate authentication token",
            )),
        )
    })?;

    Ok(Json(LoginResponse { token }))
}
