//! Authentication middleware

use std::sync::Arc;

use axum::Json;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;

use super::context::AuthContext;
use super::jwt::JwtError;
use super::manager::AuthManager;
use crate::api::middleware::AllowedOrigins;
use crate::api::types::ErrorBody;
use crate::core::constants::SESSION_COOKIE_NAME;
use crate::data::UserRepository;

/// Authentication error response
#[derive(Debug)]
pub struct AuthError {
    pub status: StatusCode,
    pub error: &'static str,
    pub code: &'static str,
    pub message: String,
}

impl AuthError {
    pub fn required() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            error: "unauthorized",
            code: "AUTH_REQUIRED",
            message: "Authentication required".to_string(),
        }
    }

    pub fn expired() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            error: "unauthorized",
            code: "TOKEN_EXPIRED",
            message: "Session has expired".to_string(),
        }
    }

    pub fn invalid() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            error: "unauthorized",
            code: "TOKEN_INVALID",
            message: "Invalid session token".to_string(),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: "internal_error",
            code: "INTERNAL_ERROR",
            message: "Session lookup failed".to_string(),
        }
    }

    pub fn origin_not_allowed() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            error: "unauthorized",
            code: "ORIGIN_NOT_ALLOWED",
            message: "Request origin not allowed".to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.error.to_string(),
            code: self.code.to_string(),
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Shared auth state for middleware
#[derive(Clone)]
pub struct AuthState {
    pub auth_manager: Arc<AuthManager>,
    pub allowed_origins: AllowedOrigins,
    pub users: Arc<dyn UserRepository>,
}

/// Origin of the request: the `Origin` header, else scheme+host+port of `Referer`
fn request_origin(headers: &HeaderMap) -> Option<String> {
    if let Some(origin) = headers.get(header::ORIGIN).and_then(|v| v.to_str().ok()) {
        return Some(origin.to_string());
    }

    let referer = headers.get(header::REFERER).and_then(|v| v.to_str().ok())?;
    match reqwest::Url::parse(referer) {
        Ok(u) => match u.host_str() {
            Some(host) => Some(match u.port() {
                Some(port) => format!("{}://{}:{}", u.scheme(), host, port),
                None => format!("{}://{}", u.scheme(), host),
            }),
            None => {
                tracing::warn!(referer = %referer, "Referer URL has no host");
                None
            }
        },
        Err(_) => {
            tracing::debug!(referer = %referer, "Failed to parse Referer URL");
            None
        }
    }
}

/// CSRF check. Requests without Origin/Referer (non-browser clients) pass.
pub fn check_origin(headers: &HeaderMap, allowed: &AllowedOrigins) -> Result<(), AuthError> {
    if let Some(origin) = request_origin(headers)
        && !allowed.is_allowed(&origin)
    {
        tracing::warn!("Rejected request from disallowed origin: {}", origin);
        return Err(AuthError::origin_not_allowed());
    }
    Ok(())
}

/// Authentication middleware
///
/// Validates the session cookie, reloads the account it names and injects
/// `AuthContext` into request extensions for the `Auth` / `AdminAuth`
/// extractors. Username and role come from the stored account, so a
/// demotion or deletion applies to sessions already issued.
pub async fn require_auth(
    State(state): State<AuthState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    check_origin(request.headers(), &state.allowed_origins)?;

    let session_cookie = jar
        .get(SESSION_COOKIE_NAME)
        .ok_or_else(AuthError::required)?;

    let claims = state
        .auth_manager
        .validate_session(session_cookie.value())
        .map_err(|e| match e {
            JwtError::Expired => AuthError::expired(),
            _ => AuthError::invalid(),
        })?;

    let user_id = claims.user_id().ok_or_else(AuthError::invalid)?;

    let user = state
        .users
        .get_user(user_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id, "Failed to load session user");
            AuthError::unavailable()
        })?
        .ok_or_else(|| {
            tracing::debug!(user_id, "Session refers to a deleted account");
            AuthError::invalid()
        })?;

    let auth_ctx = AuthContext {
        user_id,
        username: user.username,
        role: user.role,
        expires_at: claims.exp,
    };
    request.extensions_mut().insert(auth_ctx);

    Ok(next.run(request).await)
}
