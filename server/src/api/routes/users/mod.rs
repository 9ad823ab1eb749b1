//! User administration endpoints
//!
//! Everything here is admin-only except `/me`.

pub mod types;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::auth::{AdminAuth, Auth};
use crate::api::extractors::{UserIdPath, ValidatedJson};
use crate::api::types::ApiError;
use crate::data::types::{LastAdminResult, NewUser, UserUpdate};
use crate::data::{DataError, UserRepository};
use crate::utils::password::hash_password;

use types::{CreateUserRequest, UpdateUserRequest, UserDto};

/// Shared state for Users API endpoints
#[derive(Clone)]
pub struct UsersApiState {
    pub users: Arc<dyn UserRepository>,
}

/// Build Users API routes
pub fn routes(users: Arc<dyn UserRepository>) -> Router<()> {
    let state = UsersApiState { users };

    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/me", get(get_current_user))
        .route("/{id}", get(get_user).put(update_user).delete(delete_user))
        .with_state(state)
}

fn user_not_found() -> ApiError {
    ApiError::not_found("USER_NOT_FOUND", "User not found")
}

fn last_admin() -> ApiError {
    ApiError::conflict("LAST_ADMIN", "At least one admin account must remain")
}

async fn hash_blocking(password: String) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Password hashing task failed");
            ApiError::internal("Password hashing failed")
        })?
        .map_err(|e| {
            tracing::error!(error = %e, "Password hashing failed");
            ApiError::internal("Password hashing failed")
        })
}

/// List all users
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "users",
    responses(
        (status = 200, description = "All user accounts", body = Vec<UserDto>),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn list_users(
    State(state): State<UsersApiState>,
    _auth: AdminAuth,
) -> Result<Json<Vec<UserDto>>, ApiError> {
    let users = state
        .users
        .list_users()
        .await
        .map_err(ApiError::from_data)?;

    Ok(Json(users.into_iter().map(UserDto::from).collect()))
}

/// Create a user
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserDto),
        (status = 400, description = "Invalid request"),
        (status = 403, description = "Admin role required"),
        (status = 409, description = "Username already taken")
    )
)]
pub async fn create_user(
    State(state): State<UsersApiState>,
    auth: AdminAuth,
    ValidatedJson(request): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserDto>), ApiError> {
    let password_hash = hash_blocking(request.password).await?;

    let new = NewUser {
        username: request.username,
        password_hash,
        email: request.email,
        role: request.role.unwrap_or_default(),
    };

    let user = match state.users.create_user(&new).await {
        Ok(user) => user,
        Err(DataError::Conflict(_)) => {
            return Err(ApiError::conflict(
                "USERNAME_TAKEN",
                format!("Username '{}' is already taken", new.username),
            ));
        }
        Err(e) => return Err(ApiError::from_data(e)),
    };

    tracing::info!(
        user_id = user.id,
        username = %user.username,
        role = %user.role,
        by = auth.ctx.user_id,
        "User created"
    );

    Ok((StatusCode::CREATED, Json(UserDto::from(user))))
}

/// Get the current session's user
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    tag = "users",
    responses(
        (status = 200, description = "Current user", body = UserDto),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_current_user(
    State(state): State<UsersApiState>,
    auth: Auth,
) -> Result<Json<UserDto>, ApiError> {
    let user = state
        .users
        .get_user(auth.ctx.user_id)
        .await
        .map_err(ApiError::from_data)?
        .ok_or_else(user_not_found)?;

    Ok(Json(UserDto::from(user)))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = UserDto),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<UsersApiState>,
    _auth: AdminAuth,
    path: UserIdPath,
) -> Result<Json<UserDto>, ApiError> {
    let user = state
        .users
        .get_user(path.id)
        .await
        .map_err(ApiError::from_data)?
        .ok_or_else(user_not_found)?;

    Ok(Json(UserDto::from(user)))
}

/// Update a user's email, role or password
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = UserDto),
        (status = 400, description = "Invalid request"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Would demote the last admin")
    )
)]
pub async fn update_user(
    State(state): State<UsersApiState>,
    auth: AdminAuth,
    path: UserIdPath,
    ValidatedJson(request): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<UserDto>, ApiError> {
    let password_hash = match request.password {
        Some(password) => Some(hash_blocking(password).await?),
        None => None,
    };

    let update = UserUpdate {
        email: request.email,
        role: request.role,
        password_hash,
    };

    if update.is_empty() {
        return get_user(State(state), auth, path).await;
    }

    match state
        .users
        .update_user(path.id, &update)
        .await
        .map_err(ApiError::from_data)?
    {
        LastAdminResult::Success(user) => {
            tracing::info!(user_id = user.id, by = auth.ctx.user_id, "User updated");
            Ok(Json(UserDto::from(user)))
        }
        LastAdminResult::LastAdmin => Err(last_admin()),
        LastAdminResult::NotFound => Err(user_not_found()),
    }
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Own account or last admin")
    )
)]
pub async fn delete_user(
    State(state): State<UsersApiState>,
    auth: AdminAuth,
    path: UserIdPath,
) -> Result<StatusCode, ApiError> {
    if path.id == auth.ctx.user_id {
        return Err(ApiError::conflict(
            "CANNOT_DELETE_SELF",
            "You cannot delete your own account",
        ));
    }

    match state
        .users
        .delete_user(path.id)
        .await
        .map_err(ApiError::from_data)?
    {
        LastAdminResult::Success(()) => {}
        LastAdminResult::LastAdmin => return Err(last_admin()),
        LastAdminResult::NotFound => return Err(user_not_found()),
    }

    tracing::info!(user_id = path.id, by = auth.ctx.user_id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::auth::AuthManager;
    use crate::api::test_support::*;
    use crate::data::types::{UserRole, UserRow};
    use tower::ServiceExt;

    struct Fixture {
        router: Router,
        manager: Arc<AuthManager>,
        repo: Arc<dyn UserRepository>,
        admin: UserRow,
        admin_cookie: String,
    }

    async fn fixture() -> Fixture {
        let repo = user_repo().await;
        let manager = auth_manager();
        let admin = seed_user(&repo, "admin", "admin123", UserRole::Admin).await;
        let admin_cookie = session_cookie(&manager, &admin);
        let router = protect(routes(repo.clone()), manager.clone(), repo.clone());
        Fixture {
            router,
            manager,
            repo,
            admin,
            admin_cookie,
        }
    }

    #[tokio::test]
    async fn test_requires_session() {
        let f = fixture().await;
        let response = f
            .router
            .oneshot(empty_request("GET", "/", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["code"], "AUTH_REQUIRED");
    }

    #[tokio::test]
    async fn test_bad_token_rejected() {
        let f = fixture().await;
        let response = f
            .router
            .oneshot(empty_request("GET", "/", Some("holonet_session=abc.def.ghi")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["code"], "TOKEN_INVALID");
    }

    #[tokio::test]
    async fn test_non_admin_forbidden() {
        let f = fixture().await;
        let user = seed_user(&f.repo, "rey", "jakku", UserRole::User).await;
        let cookie = session_cookie(&f.manager, &user);

        let response = f
            .router
            .clone()
            .oneshot(empty_request("GET", "/", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_json(response).await["code"], "ADMIN_REQUIRED");

        let me = f
            .router
            .oneshot(empty_request("GET", "/me", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(me.status(), StatusCode::OK);
        let body = body_json(me).await;
        assert_eq!(body["username"], "rey");
        assert_eq!(body["role"], "user");
    }

    #[tokio::test]
    async fn test_create_list_get() {
        let f = fixture().await;

        let response = f
            .router
            .clone()
            .oneshot(json_request(
                "POST",
                "/",
                Some(&f.admin_cookie),
                r#"{"username":"luke","password":"x-wing","email":"luke@tatooine.org"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response).await;
        assert_eq!(created["username"], "luke");
        assert_eq!(created["role"], "user");
        assert!(created.get("password_hash").is_none());
        let id = created["id"].as_i64().unwrap();

        let stored = f.repo.get_user(id).await.unwrap().unwrap();
        assert!(stored.password_hash.starts_with("$argon2id$"));

        let list = f
            .router
            .clone()
            .oneshot(empty_request("GET", "/", Some(&f.admin_cookie)))
            .await
            .unwrap();
        assert_eq!(list.status(), StatusCode::OK);
        let list = body_json(list).await;
        assert_eq!(list.as_array().unwrap().len(), 2);

        let one = f
            .router
            .oneshot(empty_request("GET", &format!("/{}", id), Some(&f.admin_cookie)))
            .await
            .unwrap();
        assert_eq!(one.status(), StatusCode::OK);
        assert_eq!(body_json(one).await["email"], "luke@tatooine.org");
    }

    #[tokio::test]
    async fn test_create_duplicate_and_invalid() {
        let f = fixture().await;

        let duplicate = f
            .router
            .clone()
            .oneshot(json_request(
                "POST",
                "/",
                Some(&f.admin_cookie),
                r#"{"username":"admin","password":"again"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(duplicate.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(duplicate).await["code"], "USERNAME_TAKEN");

        let invalid = f
            .router
            .oneshot(json_request(
                "POST",
                "/",
                Some(&f.admin_cookie),
                r#"{"username":"bad name!","password":"x"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(invalid).await["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_get_unknown_and_invalid_id() {
        let f = fixture().await;

        let missing = f
            .router
            .clone()
            .oneshot(empty_request("GET", "/999", Some(&f.admin_cookie)))
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(missing).await["code"], "USER_NOT_FOUND");

        let invalid = f
            .router
            .oneshot(empty_request("GET", "/abc", Some(&f.admin_cookie)))
            .await
            .unwrap();
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(invalid).await["code"], "INVALID_USER_ID");
    }

    #[tokio::test]
    async fn test_update_user() {
        let f = fixture().await;
        let user = seed_user(&f.repo, "finn", "fn-2187", UserRole::User).await;

        let response = f
            .router
            .clone()
            .oneshot(json_request(
                "PUT",
                &format!("/{}", user.id),
                Some(&f.admin_cookie),
                r#"{"email":"finn@resistance.org","role":"admin","password":"new-pass"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["email"], "finn@resistance.org");
        assert_eq!(body["role"], "admin");

        let stored = f.repo.get_user(user.id).await.unwrap().unwrap();
        assert_ne!(stored.password_hash, user.password_hash);

        let empty = f
            .router
            .clone()
            .oneshot(json_request(
                "PUT",
                &format!("/{}", user.id),
                Some(&f.admin_cookie),
                "{}",
            ))
            .await
            .unwrap();
        assert_eq!(empty.status(), StatusCode::OK);
        assert_eq!(body_json(empty).await["role"], "admin");

        let missing = f
            .router
            .oneshot(json_request(
                "PUT",
                "/999",
                Some(&f.admin_cookie),
                r#"{"role":"user"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cannot_demote_last_admin() {
        let f = fixture().await;
        let response = f
            .router
            .oneshot(json_request(
                "PUT",
                &format!("/{}", f.admin.id),
                Some(&f.admin_cookie),
                r#"{"role":"user"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(response).await["code"], "LAST_ADMIN");
    }

    #[tokio::test]
    async fn test_delete_user() {
        let f = fixture().await;
        let user = seed_user(&f.repo, "greedo", "shot-first", UserRole::User).await;

        let response = f
            .router
            .clone()
            .oneshot(empty_request(
                "DELETE",
                &format!("/{}", user.id),
                Some(&f.admin_cookie),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(f.repo.get_user(user.id).await.unwrap().is_none());

        let again = f
            .router
            .oneshot(empty_request(
                "DELETE",
                &format!("/{}", user.id),
                Some(&f.admin_cookie),
            ))
            .await
            .unwrap();
        assert_eq!(again.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cannot_delete_self() {
        let f = fixture().await;
        let response = f
            .router
            .oneshot(empty_request(
                "DELETE",
                &format!("/{}", f.admin.id),
                Some(&f.admin_cookie),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(response).await["code"], "CANNOT_DELETE_SELF");
    }

    #[tokio::test]
    async fn test_concurrent_admin_deletes_keep_one_admin() {
        let f = fixture().await;
        let leia = seed_user(&f.repo, "leia", "alderaan", UserRole::Admin).await;
        let leia_cookie = session_cookie(&f.manager, &leia);

        let (first, second) = tokio::join!(
            f.router.clone().oneshot(empty_request(
                "DELETE",
                &format!("/{}", leia.id),
                Some(&f.admin_cookie),
            )),
            f.router.clone().oneshot(empty_request(
                "DELETE",
                &format!("/{}", f.admin.id),
                Some(&leia_cookie),
            )),
        );
        let statuses = [first.unwrap().status(), second.unwrap().status()];

        assert_eq!(
            statuses.iter().filter(|s| **s == StatusCode::NO_CONTENT).count(),
            1,
            "statuses: {:?}",
            statuses
        );
        assert!(
            statuses
                .iter()
                .any(|s| *s == StatusCode::CONFLICT || *s == StatusCode::UNAUTHORIZED),
            "statuses: {:?}",
            statuses
        );
        assert_eq!(f.repo.count_admins().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_deleted_admin_session_rejected() {
        let f = fixture().await;
        let leia = seed_user(&f.repo, "leia", "alderaan", UserRole::Admin).await;
        let leia_cookie = session_cookie(&f.manager, &leia);

        let response = f
            .router
            .clone()
            .oneshot(empty_request(
                "DELETE",
                &format!("/{}", leia.id),
                Some(&f.admin_cookie),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        // The deleted admin's session no longer authenticates
        let response = f
            .router
            .oneshot(empty_request(
                "DELETE",
                &format!("/{}", f.admin.id),
                Some(&leia_cookie),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["code"], "TOKEN_INVALID");
        assert!(f.repo.get_user(f.admin.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_demoted_admin_session_loses_admin_rights() {
        let f = fixture().await;
        let former = seed_user(&f.repo, "palpatine", "order66", UserRole::Admin).await;
        let cookie = session_cookie(&f.manager, &former);
        let demote = UserUpdate {
            role: Some(UserRole::User),
            ..Default::default()
        };
        assert!(matches!(
            f.repo.update_user(former.id, &demote).await.unwrap(),
            LastAdminResult::Success(_)
        ));

        let response = f
            .router
            .clone()
            .oneshot(empty_request(
                "DELETE",
                &format!("/{}", f.admin.id),
                Some(&cookie),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_json(response).await["code"], "ADMIN_REQUIRED");
        assert!(f.repo.get_user(f.admin.id).await.unwrap().is_some());

        let me = f
            .router
            .oneshot(empty_request("GET", "/me", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(me.status(), StatusCode::OK);
        assert_eq!(body_json(me).await["role"], "user");
    }

    #[tokio::test]
    async fn test_expired_session_rejected() {
        let f = fixture().await;
        let cookie = expired_session_cookie(&f.admin);

        let response = f
            .router
            .oneshot(empty_request("GET", "/", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["code"], "TOKEN_EXPIRED");
    }
}
