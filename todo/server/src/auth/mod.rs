use askama::Template;
use axum::Router;
use axum::extract::{Extension, Form, FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::{Extensions, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::Cookie;
use jsonwebtoken::encode;
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::Config;
use crate::task::Actor;

pub mod api;

pub const AUTH_COOKIE: &str = "auth_token";

/// Represents the currently authenticated user.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub username: String,
}

impl CurrentUser {
    /// Creates a new CurrentUser instance.
    pub fn new(username: String) -> Self {
        Self { username }
    }
}

/// Supplies the identity of whoever is performing the current request.
pub trait IdentityProvider {
    fn current_actor(&self) -> Option<Actor>;
}

impl IdentityProvider for Extensions {
    fn current_actor(&self) -> Option<Actor> {
        self.get::<CurrentUser>()
            .map(|user| Actor::new(user.username.clone()))
    }
}

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .current_actor()
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}

/// Authentication state containing user credentials and JWT secret.
#[derive(Clone)]
pub struct AuthState {
    pub users: HashMap<String, String>,
    pub jwt_secret: String,
}

impl AuthState {
    /// Creates a new AuthState from the application config.
    pub fn from_config(config: &Config) -> Self {
        Self {
            users: config.users.clone(),
            jwt_secret: config.jwt_secret.clone(),
        }
    }

    /// Checks submitted credentials against the configured users.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        self.users
            .get(username)
            .is_some_and(|expected| expected == password)
    }
}

/// Creates a login router with authentication routes.
pub fn create_login_router(state: Arc<AuthState>) -> Router<()> {
    Router::new()
        .route(
            "/login",
            axum::routing::get(login_page_handler).post(login_handler),
        )
        .route("/logout", axum::routing::post(logout_handler))
        .with_state(state)
}

/// Authentication middleware that checks for valid JWT tokens and sets CurrentUser extension.
/// This middleware only populates the CurrentUser extension and does not perform redirects.
pub async fn auth_user_middleware(
    State(state): State<Arc<AuthState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token_cookie) = jar.get(AUTH_COOKIE) {
        if let Ok(claims) = decode_jwt(token_cookie.value(), &state.jwt_secret) {
            request
                .extensions_mut()
                .insert(CurrentUser::new(claims.username));
        }
    }

    next.run(request).await
}

/// Redirects unauthenticated users to the login page.
/// Must run after auth_user_middleware.
pub async fn login_redirect_middleware(request: Request, next: Next) -> Response {
    if request.extensions().current_actor().is_none() {
        return Redirect::to("/login").into_response();
    }

    next.run(request).await
}

/// Represents the login request payload.
#[derive(serde::Deserialize, Debug)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct Claims {
    pub exp: usize,
    pub iat: usize,
    pub username: String,
}

/// Custom error type for authentication operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Represents an error during template rendering.
    #[error("Template rendering failed")]
    Template(#[from] askama::Error),
    /// Represents an error during JWT operations.
    #[error("JWT operation failed")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        tracing::error!("Authentication request failed: {}", self);
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

/// Handles the login form.
/// A user who is already logged in just gets the success message again.
pub async fn login_handler(
    State(state): State<Arc<AuthState>>,
    jar: CookieJar,
    current_user: Option<Extension<CurrentUser>>,
    Form(payload): Form<LoginRequest>,
) -> Result<(CookieJar, Response), AuthError> {
    if let Some(Extension(user)) = current_user {
        let html = LoginSuccessTemplate {
            name: &user.username,
        }
        .render()?;
        return Ok((jar, Html(html).into_response()));
    }

    handle_login_attempt(state, jar, payload)
}

#[tracing::instrument(skip(state, jar, payload), fields(username = %payload.username))]
fn handle_login_attempt(
    state: Arc<AuthState>,
    jar: CookieJar,
    payload: LoginRequest,
) -> Result<(CookieJar, Response), AuthError> {
    if !state.verify(&payload.username, &payload.password) {
        tracing::info!("Rejected login attempt");
        let error_message = LoginErrorMessageTemplate.render()?;

        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("hx-retarget"),
            HeaderValue::from_static("#login-message"),
        );
        headers.insert(
            HeaderName::from_static("hx-reswap"),
            HeaderValue::from_static("outerHTML"),
        );

        let mut response = Html(error_message).into_response();
        response.headers_mut().extend(headers);
        return Ok((jar, response));
    }

    let jwt_token = encode_jwt(payload.username.clone(), &state.jwt_secret)?;
    let cookie = Cookie::build((AUTH_COOKIE, jwt_token))
        .http_only(true)
        .secure(false) // Set to true in production with HTTPS
        .same_site(axum_extra::extract::cookie::SameSite::Lax)
        .max_age(time::Duration::hours(24))
        .path("/")
        .build();

    let html = LoginSuccessTemplate {
        name: &payload.username,
    }
    .render()?;

    tracing::info!("User logged in");
    Ok((jar.add(cookie), Html(html).into_response()))
}

/// Clears the auth cookie and sends the user back to the login page.
#[tracing::instrument(skip(jar))]
pub async fn logout_handler(jar: CookieJar) -> (CookieJar, Redirect) {
    let jar = jar.remove(Cookie::build(AUTH_COOKIE).path("/"));
    (jar, Redirect::to("/login"))
}

pub fn encode_jwt(username: String, jwt_secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let expire = chrono::Duration::hours(24);
    let exp = (now + expire).timestamp() as usize;
    let iat = now.timestamp() as usize;
    let claims = Claims { exp, iat, username };
    encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
}

pub fn decode_jwt(token: &str, jwt_secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = jsonwebtoken::decode(
        token,
        &jsonwebtoken::DecodingKey::from_secret(jwt_secret.as_bytes()),
        &jsonwebtoken::Validation::default(),
    )?;
    Ok(token_data.claims)
}

#[derive(Template)]
#[template(path = "login/login_success.html")]
pub struct LoginSuccessTemplate<'a> {
    pub name: &'a str,
}

#[derive(Template)]
#[template(path = "login/login_error_message.html")]
pub struct LoginErrorMessageTemplate;

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub username: Option<String>,
}

/// Handles GET requests to display the login page.
#[tracing::instrument]
pub async fn login_page_handler(
    current_user: Option<Extension<CurrentUser>>,
) -> Result<Html<String>, AuthError> {
    let username = current_user.map(|Extension(user)| user.username);

    let template = LoginTemplate { username };
    Ok(Html(template.render()?))
}
