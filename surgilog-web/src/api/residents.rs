//! Resident endpoints

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use tracing::info;

use surgilog_common::models::{CurrentUser, Resident};

use crate::api::auth::require_admin;
use crate::db::{areas, residents};
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct ResidentRequest {
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default = "default_training_year")]
    pub training_year: i64,
}

fn default_training_year() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
pub struct MoveResidentRequest {
    pub from_area_guid: String,
    pub to_area_guid: String,
}

/// POST /api/residents (admin)
pub async fn create_resident(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<ResidentRequest>,
) -> ApiResult<Json<Resident>> {
    require_admin(&user)?;

    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Resident name cannot be empty".to_string(),
        ));
    }

    let resident = residents::create_resident(
        &state.db,
        payload.name.trim(),
        &payload.email,
        payload.training_year,
    )
    .await?;
    info!("Resident '{}' created", resident.name);

    Ok(Json(resident))
}

/// GET /api/residents
pub async fn list_residents(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<Resident>>> {
    Ok(Json(residents::list_residents(&state.db).await?))
}

/// GET /api/residents/:guid
pub async fn get_resident(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
    Path(guid): Path<String>,
) -> ApiResult<Json<Resident>> {
    residents::get_resident(&state.db, &guid)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Resident {}", guid)))
}

/// PUT /api/residents/:guid (admin)
pub async fn update_resident(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(guid): Path<String>,
    Json(payload): Json<ResidentRequest>,
) -> ApiResult<Json<Resident>> {
    require_admin(&user)?;

    if residents::get_resident(&state.db, &guid).await?.is_none() {
        return Err(ApiError::NotFound(format!("Resident {}", guid)));
    }

    residents::update_resident(
        &state.db,
        &guid,
        payload.name.trim(),
        &payload.email,
        payload.training_year,
    )
    .await?;

    residents::get_resident(&state.db, &guid)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Resident {}", guid)))
}

/// DELETE /api/residents/:guid (admin, soft delete)
pub async fn delete_resident(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(guid): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    require_admin(&user)?;

    if residents::get_resident(&state.db, &guid).await?.is_none() {
        return Err(ApiError::NotFound(format!("Resident {}", guid)));
    }

    residents::soft_delete_resident(&state.db, &guid).await?;
    info!("Resident {} soft-deleted", guid);

    Ok(Json(serde_json::json!({ "success": true })))
}

/// POST /api/residents/:guid/move (admin)
///
/// Appends the resident to the destination area's list, then removes them
/// from the origin list. The two steps are not atomic.
pub async fn move_resident(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(guid): Path<String>,
    Json(payload): Json<MoveResidentRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    require_admin(&user)?;

    if residents::get_resident(&state.db, &guid).await?.is_none() {
        return Err(ApiError::NotFound(format!("Resident {}", guid)));
    }
    if areas::get_area(&state.db, &payload.from_area_guid)
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound(format!(
            "Area {}",
            payload.from_area_guid
        )));
    }
    if areas::get_area(&state.db, &payload.to_area_guid)
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound(format!("Area {}", payload.to_area_guid)));
    }

    areas::move_resident(
        &state.db,
        &guid,
        &payload.from_area_guid,
        &payload.to_area_guid,
    )
    .await?;
    info!(
        "Resident {} moved from area {} to area {}",
        guid, payload.from_area_guid, payload.to_area_guid
    );

    Ok(Json(serde_json::json!({ "success": true })))
}
