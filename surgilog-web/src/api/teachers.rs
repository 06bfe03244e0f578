//! Teacher endpoints

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use tracing::info;

use surgilog_common::models::{CurrentUser, Teacher};

use crate::api::auth::require_admin;
use crate::db::teachers;
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct TeacherRequest {
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// POST /api/teachers (admin)
pub async fn create_teacher(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<TeacherRequest>,
) -> ApiResult<Json<Teacher>> {
    require_admin(&user)?;

    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Teacher name cannot be empty".to_string(),
        ));
    }

    let teacher = teachers::create_teacher(&state.db, payload.name.trim(), &payload.email).await?;
    info!("Teacher '{}' created", teacher.name);

    Ok(Json(teacher))
}

/// GET /api/teachers
pub async fn list_teachers(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<Teacher>>> {
    Ok(Json(teachers::list_teachers(&state.db).await?))
}

/// GET /api/teachers/:guid
pub async fn get_teacher(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
    Path(guid): Path<String>,
) -> ApiResult<Json<Teacher>> {
    teachers::get_teacher(&state.db, &guid)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Teacher {}", guid)))
}

/// PUT /api/teachers/:guid (admin)
pub async fn update_teacher(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(guid): Path<String>,
    Json(payload): Json<TeacherRequest>,
) -> ApiResult<Json<Teacher>> {
    require_admin(&user)?;

    if teachers::get_teacher(&state.db, &guid).await?.is_none() {
        return Err(ApiError::NotFound(format!("Teacher {}", guid)));
    }

    teachers::update_teacher(&state.db, &guid, payload.name.trim(), &payload.email).await?;

    teachers::get_teacher(&state.db, &guid)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Teacher {}", guid)))
}

/// DELETE /api/teachers/:guid (admin, soft delete)
///
/// Also pulls the teacher from every area's teacher list.
pub async fn delete_teacher(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(guid): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    require_admin(&user)?;

    if teachers::get_teacher(&state.db, &guid).await?.is_none() {
        return Err(ApiError::NotFound(format!("Teacher {}", guid)));
    }

    teachers::soft_delete_teacher(&state.db, &guid).await?;
    info!("Teacher {} soft-deleted and removed from all areas", guid);

    Ok(Json(serde_json::json!({ "success": true })))
}
