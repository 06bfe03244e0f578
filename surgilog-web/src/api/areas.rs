//! Area endpoints: CRUD plus membership management
//!
//! Area detail responses carry the ordered resident and teacher lists.
//! Membership adds check existence of both sides first, then append; adding
//! an existing member is a no-op.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use tracing::info;

use surgilog_common::models::{Area, AreaDetail, CurrentUser};

use crate::api::auth::require_admin;
use crate::db::{areas, residents, teachers};
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct AreaRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct AddResidentRequest {
    pub resident_guid: String,
}

#[derive(Debug, Deserialize)]
pub struct AddTeacherRequest {
    pub teacher_guid: String,
}

/// POST /api/areas (admin)
pub async fn create_area(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<AreaRequest>,
) -> ApiResult<Json<Area>> {
    require_admin(&user)?;

    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Area name cannot be empty".to_string()));
    }

    let area = areas::create_area(&state.db, payload.name.trim(), &payload.description).await?;
    info!("Area '{}' created", area.name);

    Ok(Json(area))
}

/// GET /api/areas
pub async fn list_areas(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<Area>>> {
    Ok(Json(areas::list_areas(&state.db).await?))
}

/// GET /api/areas/:guid
///
/// Returns the area with its ordered membership lists populated.
pub async fn get_area(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
    Path(guid): Path<String>,
) -> ApiResult<Json<AreaDetail>> {
    areas::get_area_detail(&state.db, &guid)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Area {}", guid)))
}

/// PUT /api/areas/:guid (admin)
pub async fn update_area(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(guid): Path<String>,
    Json(payload): Json<AreaRequest>,
) -> ApiResult<Json<Area>> {
    require_admin(&user)?;

    if areas::get_area(&state.db, &guid).await?.is_none() {
        return Err(ApiError::NotFound(format!("Area {}", guid)));
    }

    areas::update_area(&state.db, &guid, payload.name.trim(), &payload.description).await?;

    areas::get_area(&state.db, &guid)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Area {}", guid)))
}

/// DELETE /api/areas/:guid (admin, soft delete)
pub async fn delete_area(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(guid): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    require_admin(&user)?;

    if areas::get_area(&state.db, &guid).await?.is_none() {
        return Err(ApiError::NotFound(format!("Area {}", guid)));
    }

    areas::soft_delete_area(&state.db, &guid).await?;
    info!("Area {} soft-deleted", guid);

    Ok(Json(serde_json::json!({ "success": true })))
}

/// POST /api/areas/:guid/residents (admin)
///
/// Idempotent: adding a resident already in the list is a no-op.
pub async fn add_resident(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(guid): Path<String>,
    Json(payload): Json<AddResidentRequest>,
) -> ApiResult<Json<AreaDetail>> {
    require_admin(&user)?;

    if areas::get_area(&state.db, &guid).await?.is_none() {
        return Err(ApiError::NotFound(format!("Area {}", guid)));
    }
    if residents::get_resident(&state.db, &payload.resident_guid)
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound(format!(
            "Resident {}",
            payload.resident_guid
        )));
    }

    areas::add_resident_to_area(&state.db, &guid, &payload.resident_guid).await?;

    areas::get_area_detail(&state.db, &guid)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Area {}", guid)))
}

/// POST /api/areas/:guid/teachers (admin)
///
/// Idempotent: adding a teacher already in the list is a no-op.
pub async fn add_teacher(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(guid): Path<String>,
    Json(payload): Json<AddTeacherRequest>,
) -> ApiResult<Json<AreaDetail>> {
    require_admin(&user)?;

    if areas::get_area(&state.db, &guid).await?.is_none() {
        return Err(ApiError::NotFound(format!("Area {}", guid)));
    }
    if teachers::get_teacher(&state.db, &payload.teacher_guid)
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound(format!(
            "Teacher {}",
            payload.teacher_guid
        )));
    }

    areas::add_teacher_to_area(&state.db, &guid, &payload.teacher_guid).await?;

    areas::get_area_detail(&state.db, &guid)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Area {}", guid)))
}
