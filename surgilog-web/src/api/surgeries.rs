//! Surgery template endpoints

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use tracing::info;

use surgilog_common::models::{CurrentUser, Surgery};

use crate::api::auth::require_admin;
use crate::db::surgeries;
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct SurgeryRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub guidelines: String,
}

/// POST /api/surgeries (admin)
pub async fn create_surgery(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<SurgeryRequest>,
) -> ApiResult<Json<Surgery>> {
    require_admin(&user)?;

    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Surgery name cannot be empty".to_string(),
        ));
    }

    let surgery = surgeries::create_surgery(
        &state.db,
        payload.name.trim(),
        &payload.description,
        &payload.steps,
        &payload.guidelines,
    )
    .await?;
    info!("Surgery '{}' created", surgery.name);

    Ok(Json(surgery))
}

/// GET /api/surgeries
pub async fn list_surgeries(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<Surgery>>> {
    Ok(Json(surgeries::list_surgeries(&state.db).await?))
}

/// GET /api/surgeries/:guid
pub async fn get_surgery(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
    Path(guid): Path<String>,
) -> ApiResult<Json<Surgery>> {
    surgeries::get_surgery(&state.db, &guid)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Surgery {}", guid)))
}

/// PUT /api/surgeries/:guid (admin)
pub async fn update_surgery(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(guid): Path<String>,
    Json(payload): Json<SurgeryRequest>,
) -> ApiResult<Json<Surgery>> {
    require_admin(&user)?;

    if surgeries::get_surgery(&state.db, &guid).await?.is_none() {
        return Err(ApiError::NotFound(format!("Surgery {}", guid)));
    }

    surgeries::update_surgery(
        &state.db,
        &guid,
        payload.name.trim(),
        &payload.description,
        &payload.steps,
        &payload.guidelines,
    )
    .await?;

    surgeries::get_surgery(&state.db, &guid)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Surgery {}", guid)))
}

/// DELETE /api/surgeries/:guid (admin, soft delete)
pub async fn delete_surgery(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(guid): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    require_admin(&user)?;

    if surgeries::get_surgery(&state.db, &guid).await?.is_none() {
        return Err(ApiError::NotFound(format!("Surgery {}", guid)));
    }

    surgeries::soft_delete_surgery(&state.db, &guid).await?;
    info!("Surgery {} soft-deleted", guid);

    Ok(Json(serde_json::json!({ "success": true })))
}
