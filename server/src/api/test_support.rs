//! Shared fixtures for router tests

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response, header};

use super::auth::jwt::create_session_token;
use super::auth::{AuthManager, AuthState, SessionClaims, require_auth};
use super::middleware::AllowedOrigins;
use crate::core::constants::SESSION_COOKIE_NAME;
use crate::data::types::{NewUser, UserRole, UserRow};
use crate::data::{SqliteService, UserRepository};
use crate::utils::password::hash_password;

pub async fn user_repo() -> Arc<dyn UserRepository> {
    let database = Arc::new(SqliteService::in_memory().await.unwrap());
    Arc::new(database)
}

const TEST_SIGNING_KEY: [u8; 32] = [7u8; 32];

pub fn auth_manager() -> Arc<AuthManager> {
    Arc::new(AuthManager::new(TEST_SIGNING_KEY.to_vec(), 24))
}

pub fn allowed_origins() -> AllowedOrigins {
    AllowedOrigins::new("127.0.0.1", 5080)
}

pub async fn seed_user(
    repo: &Arc<dyn UserRepository>,
    username: &str,
    password: &str,
    role: UserRole,
) -> UserRow {
    repo.create_user(&NewUser {
        username: username.to_string(),
        password_hash: hash_password(password).unwrap(),
        email: None,
        role,
    })
    .await
    .unwrap()
}

/// `Cookie` header value carrying a fresh session for `user`
pub fn session_cookie(manager: &AuthManager, user: &UserRow) -> String {
    let (token, _) = manager.create_session(user).unwrap();
    format!("{}={}", SESSION_COOKIE_NAME, token)
}

/// `Cookie` header value carrying a session for `user` that expired a minute ago
pub fn expired_session_cookie(user: &UserRow) -> String {
    let mut claims = SessionClaims::new(user.id, &user.username, user.role, 1);
    claims.iat -= 2 * 3600;
    claims.exp = claims.iat + 3600 - 60;
    let token = create_session_token(&TEST_SIGNING_KEY, &claims).unwrap();
    format!("{}={}", SESSION_COOKIE_NAME, token)
}

/// Wrap a router in `require_auth` the same way the server does
pub fn protect(
    router: Router,
    manager: Arc<AuthManager>,
    users: Arc<dyn UserRepository>,
) -> Router {
    router.layer(axum::middleware::from_fn_with_state(
        AuthState {
            auth_manager: manager,
            allowed_origins: allowed_origins(),
            users,
        },
        require_auth,
    ))
}

pub fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn empty_request(method: &str, uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
