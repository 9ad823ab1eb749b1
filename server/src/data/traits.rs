//! Repository traits
//!
//! Handlers depend on these traits rather than on a concrete backend.

use async_trait::async_trait;

use super::error::DataError;
use super::types::{LastAdminResult, NewUser, UserRow, UserUpdate};

/// User account storage
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a user. A taken username yields `DataError::Conflict`.
    async fn create_user(&self, new: &NewUser) -> Result<UserRow, DataError>;

    async fn get_user(&self, id: i64) -> Result<Option<UserRow>, DataError>;

    async fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>, DataError>;

    /// All users ordered by ID
    async fn list_users(&self) -> Result<Vec<UserRow>, DataError>;

    /// Partial update; refuses to demote the last admin
    async fn update_user(
        &self,
        id: i64,
        update: &UserUpdate,
    ) -> Result<LastAdminResult<UserRow>, DataError>;

    /// Delete a user; refuses to remove the last admin
    async fn delete_user(&self, id: i64) -> Result<LastAdminResult<()>, DataError>;

    async fn count_admins(&self) -> Result<i64, DataError>;

    /// Seed an admin account if the username is free. Returns true when created.
    async fn ensure_admin(
        &self,
        username: &str,
        password_hash: &str,
        email: Option<&str>,
    ) -> Result<bool, DataError>;
}
