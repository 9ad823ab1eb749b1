//! Authenticated request context

use crate::api::types::ApiError;
use crate::data::types::UserRole;

/// Identity of the session behind a request, injected by `require_auth`.
///
/// Username and role are read from the stored account on every request.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: i64,
    pub username: String,
    pub role: UserRole,
    /// Session expiry (unix seconds)
    pub expires_at: i64,
}

impl AuthContext {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Fail with 403 unless the session holds the admin role
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::forbidden(
                "ADMIN_REQUIRED",
                "This operation requires the admin role",
            ))
        }
    }
}
