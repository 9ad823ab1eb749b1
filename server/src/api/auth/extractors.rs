//! Auth extractors for route handlers
//!
//! Both read the `AuthContext` that `require_auth` placed in request
//! extensions; routes using them must sit behind that middleware.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};

use super::context::AuthContext;
use crate::api::types::ApiError;

/// Auth extractor rejection
pub enum AuthRejection {
    /// Authorization failed
    Auth(ApiError),
    /// Auth context not available (middleware not applied)
    MissingContext,
}

impl From<ApiError> for AuthRejection {
    fn from(e: ApiError) -> Self {
        Self::Auth(e)
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Auth(e) => e.into_response(),
            Self::MissingContext => {
                ApiError::internal("Auth context not available").into_response()
            }
        }
    }
}

fn extract_auth(parts: &Parts) -> Result<AuthContext, AuthRejection> {
    parts
        .extensions
        .get::<AuthContext>()
        .cloned()
        .ok_or(AuthRejection::MissingContext)
}

/// Any authenticated session
pub struct Auth {
    pub ctx: AuthContext,
}

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self {
            ctx: extract_auth(parts)?,
        })
    }
}

/// Session holding the admin role (403 `ADMIN_REQUIRED` otherwise)
pub struct AdminAuth {
    pub ctx: AuthContext,
}

impl<S> FromRequestParts<S> for AdminAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = extract_auth(parts)?;
        ctx.require_admin()?;
        Ok(Self { ctx })
    }
}
