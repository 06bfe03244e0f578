//! User management endpoints (admin only)

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use tracing::info;

use surgilog_common::models::{CurrentUser, Role, User};

use crate::api::auth::require_admin;
use crate::db::users;
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub profile_guid: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub role: Role,
    #[serde(default)]
    pub profile_guid: Option<String>,
    /// When present, resets the password
    #[serde(default)]
    pub password: Option<String>,
}

/// POST /api/users (admin)
pub async fn create_user(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<Json<User>> {
    require_admin(&user)?;

    if payload.username.trim().is_empty() {
        return Err(ApiError::BadRequest("Username cannot be empty".to_string()));
    }
    if payload.password.is_empty() {
        return Err(ApiError::BadRequest("Password cannot be empty".to_string()));
    }

    if users::get_user_by_username(&state.db, &payload.username)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(format!(
            "Username '{}' already exists",
            payload.username
        )));
    }

    let created = users::create_user(
        &state.db,
        payload.username.trim(),
        &payload.password,
        payload.role,
        payload.profile_guid.as_deref(),
    )
    .await?;

    info!(
        "User '{}' created with role {}",
        created.username,
        created.role.as_str()
    );

    Ok(Json(created))
}

/// GET /api/users (admin)
pub async fn list_users(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<User>>> {
    require_admin(&user)?;
    Ok(Json(users::list_users(&state.db).await?))
}

/// GET /api/users/:guid (admin)
pub async fn get_user(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(guid): Path<String>,
) -> ApiResult<Json<User>> {
    require_admin(&user)?;

    users::get_user(&state.db, &guid)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("User {}", guid)))
}

/// PUT /api/users/:guid (admin)
pub async fn update_user(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(guid): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult<Json<User>> {
    require_admin(&user)?;

    if users::get_user(&state.db, &guid).await?.is_none() {
        return Err(ApiError::NotFound(format!("User {}", guid)));
    }

    // Validate the whole payload before writing anything
    if let Some(password) = &payload.password {
        if password.is_empty() {
            return Err(ApiError::BadRequest("Password cannot be empty".to_string()));
        }
    }

    users::update_user(
        &state.db,
        &guid,
        payload.role,
        payload.profile_guid.as_deref(),
    )
    .await?;

    if let Some(password) = &payload.password {
        users::reset_password(&state.db, &guid, password).await?;
        info!("Password reset for user {}", guid);
    }

    users::get_user(&state.db, &guid)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("User {}", guid)))
}

/// DELETE /api/users/:guid (admin)
///
/// Removes the account and its sessions. Accounts are not soft-deleted.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(guid): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    require_admin(&user)?;

    if user.user_guid == guid {
        return Err(ApiError::BadRequest(
            "Cannot delete the account you are logged in as".to_string(),
        ));
    }

    if users::get_user(&state.db, &guid).await?.is_none() {
        return Err(ApiError::NotFound(format!("User {}", guid)));
    }

    users::delete_user(&state.db, &guid).await?;
    info!("User {} deleted", guid);

    Ok(Json(serde_json::json!({ "success": true })))
}
