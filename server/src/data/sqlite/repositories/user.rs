//! User repository for SQLite operations

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::core::constants::ROLE_ADMIN;
use crate::data::sqlite::SqliteError;
use crate::data::types::{LastAdminResult, NewUser, UserRole, UserRow, UserUpdate};

const USER_COLUMNS: &str =
    "id, username, password_hash, email, role, created_at, updated_at";

fn row_to_user(row: &SqliteRow) -> Result<UserRow, SqliteError> {
    let role: String = row.try_get("role")?;
    Ok(UserRow {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
        email: row.try_get("email")?,
        // The CHECK constraint keeps role to known values
        role: UserRole::parse(&role).unwrap_or_default(),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Create a new user. A duplicate username is reported as `Conflict`.
pub async fn create_user(pool: &SqlitePool, new: &NewUser) -> Result<UserRow, SqliteError> {
    let now = chrono::Utc::now().timestamp();

    let result = sqlx::query(
        "INSERT INTO users (username, password_hash, email, role, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&new.username)
    .bind(&new.password_hash)
    .bind(new.email.as_deref())
    .bind(new.role.as_str())
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| SqliteError::from_insert(e, "username"))?;

    Ok(UserRow {
        id: result.last_insert_rowid(),
        username: new.username.clone(),
        password_hash: new.password_hash.clone(),
        email: new.email.clone(),
        role: new.role,
        created_at: now,
        updated_at: now,
    })
}

/// Get a user by ID
pub async fn get_user(pool: &SqlitePool, id: i64) -> Result<Option<UserRow>, SqliteError> {
    let sql = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
    sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .as_ref()
        .map(row_to_user)
        .transpose()
}

/// Get a user by username (exact, case-sensitive match)
pub async fn get_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<UserRow>, SqliteError> {
    let sql = format!("SELECT {} FROM users WHERE username = ?", USER_COLUMNS);
    sqlx::query(&sql)
        .bind(username)
        .fetch_optional(pool)
        .await?
        .as_ref()
        .map(row_to_user)
        .transpose()
}

/// List all users ordered by ID
pub async fn list_users(pool: &SqlitePool) -> Result<Vec<UserRow>, SqliteError> {
    let sql = format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS);
    sqlx::query(&sql)
        .fetch_all(pool)
        .await?
        .iter()
        .map(row_to_user)
        .collect()
}

/// Apply a partial update.
///
/// Demoting the only remaining admin is refused; the check and the write
/// share one transaction.
pub async fn update_user(
    pool: &SqlitePool,
    id: i64,
    update: &UserUpdate,
) -> Result<LastAdminResult<UserRow>, SqliteError> {
    let now = chrono::Utc::now().timestamp();
    let mut tx = pool.begin().await?;

    let current: Option<(String,)> = sqlx::query_as("SELECT role FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

    let Some((current_role,)) = current else {
        return Ok(LastAdminResult::NotFound);
    };

    if current_role == ROLE_ADMIN && update.role == Some(UserRole::User) {
        let admins: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = ?")
            .bind(ROLE_ADMIN)
            .fetch_one(&mut *tx)
            .await?;
        if admins <= 1 {
            return Ok(LastAdminResult::LastAdmin);
        }
    }

    sqlx::query(
        "UPDATE users SET email = COALESCE(?, email), role = COALESCE(?, role), password_hash = COALESCE(?, password_hash), updated_at = ? WHERE id = ?",
    )
    .bind(update.email.as_deref())
    .bind(update.role.map(|r| r.as_str()))
    .bind(update.password_hash.as_deref())
    .bind(now)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    let sql = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
    let row = sqlx::query(&sql).bind(id).fetch_one(&mut *tx).await?;
    let user = row_to_user(&row)?;

    tx.commit().await?;

    Ok(LastAdminResult::Success(user))
}

/// Delete a user by ID.
///
/// The admin count is checked inside the DELETE statement itself, so two
/// admins removing each other concurrently cannot leave zero admins.
pub async fn delete_user(pool: &SqlitePool, id: i64) -> Result<LastAdminResult<()>, SqliteError> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        "DELETE FROM users WHERE id = ? AND (role <> ? OR (SELECT COUNT(*) FROM users WHERE role = ?) > 1)",
    )
    .bind(id)
    .bind(ROLE_ADMIN)
    .bind(ROLE_ADMIN)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() > 0 {
        tx.commit().await?;
        return Ok(LastAdminResult::Success(()));
    }

    let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(match exists {
        Some(_) => LastAdminResult::LastAdmin,
        None => LastAdminResult::NotFound,
    })
}

/// Number of accounts holding the admin role
pub async fn count_admins(pool: &SqlitePool) -> Result<i64, SqliteError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = ?")
        .bind(ROLE_ADMIN)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Create the admin account unless a user with that username already exists.
/// Returns true when a row was inserted.
pub async fn ensure_admin(
    pool: &SqlitePool,
    username: &str,
    password_hash: &str,
    email: Option<&str>,
) -> Result<bool, SqliteError> {
    let now = chrono::Utc::now().timestamp();

    let result = sqlx::query(
        "INSERT INTO users (username, password_hash, email, role, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?) ON CONFLICT(username) DO NOTHING",
    )
    .bind(username)
    .bind(password_hash)
    .bind(email)
    .bind(ROLE_ADMIN)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
