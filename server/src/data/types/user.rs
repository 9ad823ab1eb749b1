//! User account types

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::core::constants::{ROLE_ADMIN, ROLE_USER};

// ============================================================================
// Role
// ============================================================================

/// Account role
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

impl UserRole {
    /// Parse from string representation
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            ROLE_USER => Some(Self::User),
            ROLE_ADMIN => Some(Self::Admin),
            _ => None,
        }
    }

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => ROLE_USER,
            Self::Admin => ROLE_ADMIN,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Rows and inputs
// ============================================================================

/// User row from database
#[derive(Clone)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub email: Option<String>,
    pub role: UserRole,
    pub created_at: i64,
    pub updated_at: i64,
}

impl fmt::Debug for UserRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRow")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"[REDACTED]")
            .field("email", &self.email)
            .field("role", &self.role)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Input for creating a user. The password must already be hashed.
#[derive(Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub email: Option<String>,
    pub role: UserRole,
}

/// Partial update; `None` fields are left unchanged
#[derive(Clone, Default)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub role: Option<UserRole>,
    pub password_hash: Option<String>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.role.is_none() && self.password_hash.is_none()
    }
}

/// Result type for operations that may be blocked by last-admin protection
#[derive(Debug, Clone)]
pub enum LastAdminResult<T> {
    Success(T),
    LastAdmin,
    NotFound,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_role_parse() {
        assert_eq!(UserRole::parse("user"), Some(UserRole::User));
        assert_eq!(UserRole::parse("ADMIN"), Some(UserRole::Admin));
        assert_eq!(UserRole::parse("owner"), None);
    }

    #[test]
    fn test_user_role_serde() {
        assert_eq!(serde_json::to_string(&UserRole::Admin).unwrap(), "\"admin\"");
        let role: UserRole = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(role, UserRole::User);
        assert!(serde_json::from_str::<UserRole>("\"root\"").is_err());
        assert_eq!(UserRole::default(), UserRole::User);
    }

    #[test]
    fn test_user_row_debug_redacts_hash() {
        let row = UserRow {
            id: 1,
            username: "luke".into(),
            password_hash: "$argon2id$secret".into(),
            email: None,
            role: UserRole::User,
            created_at: 0,
            updated_at: 0,
        };
        let out = format!("{:?}", row);
        assert!(out.contains("luke"));
        assert!(!out.contains("argon2id"));
    }

    #[test]
    fn test_user_update_is_empty() {
        assert!(UserUpdate::default().is_empty());
        let update = UserUpdate {
            role: Some(UserRole::Admin),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
