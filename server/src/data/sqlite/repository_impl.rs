//! UserRepository trait implementation for SQLite

use std::sync::Arc;

use async_trait::async_trait;

use crate::data::error::DataError;
use crate::data::traits::UserRepository;
use crate::data::types::{LastAdminResult, NewUser, UserRow, UserUpdate};

use super::SqliteService;
use super::repositories::user;

#[async_trait]
impl UserRepository for Arc<SqliteService> {
    async fn create_user(&self, new: &NewUser) -> Result<UserRow, DataError> {
        user::create_user(self.pool(), new)
            .await
            .map_err(Into::into)
    }

    async fn get_user(&self, id: i64) -> Result<Option<UserRow>, DataError> {
        user::get_user(self.pool(), id).await.map_err(Into::into)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>, DataError> {
        user::get_by_username(self.pool(), username)
            .await
            .map_err(Into::into)
    }

    async fn list_users(&self) -> Result<Vec<UserRow>, DataError> {
        user::list_users(self.pool()).await.map_err(Into::into)
    }

    async fn update_user(
        &self,
        id: i64,
        update: &UserUpdate,
    ) -> Result<LastAdminResult<UserRow>, DataError> {
        user::update_user(self.pool(), id, update)
            .await
            .map_err(Into::into)
    }

    async fn delete_user(&self, id: i64) -> Result<LastAdminResult<()>, DataError> {
        user::delete_user(self.pool(), id)
            .await
            .map_err(Into::into)
    }

    async fn count_admins(&self) -> Result<i64, DataError> {
        user::count_admins(self.pool()).await.map_err(Into::into)
    }

    async fn ensure_admin(
        &self,
        username: &str,
        password_hash: &str,
        email: Option<&str>,
    ) -> Result<bool, DataError> {
        user::ensure_admin(self.pool(), username, password_hash, email)
            .await
            .map_err(Into::into)
    }
}
