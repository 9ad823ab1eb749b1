//! Authentication API endpoints

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::users::types::UserDto;
use crate::api::auth::{AuthManager, check_origin};
use crate::api::extractors::ValidatedJson;
use crate::api::middleware::AllowedOrigins;
use crate::api::types::ApiError;
use crate::core::constants::SESSION_COOKIE_NAME;
use crate::data::UserRepository;
use crate::utils::password::{verify_dummy, verify_password};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 64, message = "Username must be 1-64 characters"))]
    pub username: String,
    #[validate(length(min = 1, max = 128, message = "Password must be 1-128 characters"))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub user: UserDto,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LogoutResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthStatusResponse {
    pub authenticated: bool,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserDto>,
}

/// Auth state with user store access
#[derive(Clone)]
pub struct AuthRoutesState {
    pub auth_manager: Arc<AuthManager>,
    pub allowed_origins: AllowedOrigins,
    pub users: Arc<dyn UserRepository>,
}

/// Create auth routes
pub fn routes(
    auth_manager: Arc<AuthManager>,
    allowed_origins: AllowedOrigins,
    users: Arc<dyn UserRepository>,
) -> Router {
    let state = AuthRoutesState {
        auth_manager,
        allowed_origins,
        users,
    };

    Router::new()
        .route("/login", post(login))
        .route("/status", get(auth_status))
        .route("/logout", post(logout))
        .with_state(state)
}

fn invalid_credentials() -> ApiError {
    ApiError::unauthorized("INVALID_CREDENTIALS", "Invalid username or password")
}

/// Log in with username and password
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in, session cookie set", body = LoginResponse),
        (status = 400, description = "Malformed request"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AuthRoutesState>,
    headers: HeaderMap,
    jar: CookieJar,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), Response> {
    check_origin(&headers, &state.allowed_origins).map_err(IntoResponse::into_response)?;

    let user = state
        .users
        .get_user_by_username(&request.username)
        .await
        .map_err(|e| ApiError::from_data(e).into_response())?;

    // Argon2 is CPU-bound; keep it off the async workers
    let password = request.password;
    let (user, verified) = tokio::task::spawn_blocking(move || {
        let verified = match &user {
            Some(u) => verify_password(&password, &u.password_hash).unwrap_or_else(|e| {
                tracing::error!(user_id = u.id, error = %e, "Stored password hash unreadable");
                false
            }),
            None => verify_dummy(&password),
        };
        (user, verified)
    })
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Password verification task failed");
        ApiError::internal("Password verification failed").into_response()
    })?;

    let user = match user {
        Some(user) if verified => user,
        _ => {
            tracing::debug!(username = %request.username, "Login rejected");
            return Err(invalid_credentials().into_response());
        }
    };

    let (token, claims) = state.auth_manager.create_session(&user).map_err(|e| {
        tracing::error!(error = %e, "Failed to issue session token");
        ApiError::internal("Failed to create session").into_response()
    })?;

    let cookie = Cookie::build((SESSION_COOKIE_NAME, token))
        .http_only(true)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(time::Duration::hours(i64::from(
            state.auth_manager.session_ttl_hours(),
        )))
        .build();

    tracing::info!(user_id = user.id, username = %user.username, "User logged in");

    let response = LoginResponse {
        expires_at: DateTime::from_timestamp(claims.exp, 0).unwrap_or_else(Utc::now),
        user: UserDto::from(user),
    };

    Ok((jar.add(cookie), Json(response)))
}

/// Check authentication status (returns the user when authenticated)
#[utoipa::path(
    get,
    path = "/api/v1/auth/status",
    tag = "auth",
    responses(
        (status = 200, description = "Authentication status", body = AuthStatusResponse)
    )
)]
pub async fn auth_status(
    State(state): State<AuthRoutesState>,
    jar: CookieJar,
) -> Json<AuthStatusResponse> {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    let anonymous = || {
        Json(AuthStatusResponse {
            authenticated: false,
            version: VERSION,
            expires_at: None,
            user: None,
        })
    };

    let Some(cookie) = jar.get(SESSION_COOKIE_NAME) else {
        return anonymous();
    };

    let Some((claims, user_id)) = state
        .auth_manager
        .validate_session(cookie.value())
        .ok()
        .and_then(|claims| claims.user_id().map(|id| (claims, id)))
    else {
        return anonymous();
    };

    // A session for a deleted account is no session
    match state.users.get_user(user_id).await {
        Ok(Some(user)) => Json(AuthStatusResponse {
            authenticated: true,
            version: VERSION,
            expires_at: DateTime::from_timestamp(claims.exp, 0),
            user: Some(UserDto::from(user)),
        }),
        Ok(None) => anonymous(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load user for auth status");
            anonymous()
        }
    }
}

/// Logout - clear session cookie
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Logged out successfully", body = LogoutResponse)
    )
)]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<LogoutResponse>) {
    let cookie = Cookie::build((SESSION_COOKIE_NAME, ""))
        .http_only(true)
        .same_site(SameSite::Strict)
        .path("/")
        .build();

    (
        jar.remove(cookie),
        Json(LogoutResponse {
            success: true,
            message: "Logged out successfully".to_string(),
        }),
    )
}
