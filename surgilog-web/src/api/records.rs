//! Record endpoints: CRUD plus the review lifecycle
//!
//! Lifecycle rules enforced here:
//! - creation assigns no status
//! - a resident completing a record writes judgment, comment and step
//!   evaluations; status stays untouched
//! - a teacher review sets status to `reviewed` or `corrected`; `draft` is
//!   never a legal target
//! - a resident or teacher reading a `corrected` record flips it to
//!   `reviewed` as a side effect of the read; admin reads do not

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;

use surgilog_common::db::settings::get_setting_i64;
use surgilog_common::models::{
    CurrentUser, Record, RecordDetail, RecordStatus, Role, StepEvaluation,
};

use crate::api::auth::{require_admin, require_admin_or, require_role};
use crate::db::{areas, records, residents, surgeries, teachers};
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct CreateRecordRequest {
    pub surgery_guid: String,
    pub resident_guid: String,
    pub teacher_guid: String,
    pub area_guid: String,
    pub performed_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRecordRequest {
    pub teacher_guid: String,
    pub area_guid: String,
    pub performed_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CompleteRecordRequest {
    pub judgment: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub step_evaluations: Vec<StepEvaluation>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRecordRequest {
    pub status: RecordStatus,
    #[serde(default)]
    pub teacher_comment: Option<String>,
}

/// Query parameters for record listing
#[derive(Debug, Deserialize)]
pub struct RecordListQuery {
    /// `awaiting-review` (no status yet) or `corrected` (not yet acknowledged)
    pub filter: Option<String>,
}

const DEFAULT_PAGE_SIZE: i64 = 100;

/// Listing cap from the `page_size` setting
async fn page_size(state: &AppState) -> ApiResult<i64> {
    Ok(get_setting_i64(&state.db, "page_size", DEFAULT_PAGE_SIZE).await?)
}

/// POST /api/records (teacher or admin)
pub async fn create_record(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CreateRecordRequest>,
) -> ApiResult<Json<Record>> {
    require_admin_or(&user, Role::Teacher)?;

    if surgeries::get_surgery(&state.db, &payload.surgery_guid)
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound(format!(
            "Surgery {}",
            payload.surgery_guid
        )));
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
    if teachers::get_teacher(&state.db, &payload.teacher_guid)
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound(format!(
            "Teacher {}",
            payload.teacher_guid
        )));
    }
    if areas::get_area(&state.db, &payload.area_guid).await?.is_none() {
        return Err(ApiError::NotFound(format!("Area {}", payload.area_guid)));
    }

    let record = records::create_record(
        &state.db,
        &payload.surgery_guid,
        &payload.resident_guid,
        &payload.teacher_guid,
        &payload.area_guid,
        payload.performed_at,
    )
    .await?;
    info!("Record {} created", record.guid);

    Ok(Json(record))
}

/// GET /api/records
pub async fn list_records(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
    Query(query): Query<RecordListQuery>,
) -> ApiResult<Json<Vec<Record>>> {
    let limit = page_size(&state).await?;
    let list = match query.filter.as_deref() {
        None => records::list_records(&state.db, limit).await?,
        Some("awaiting-review") => records::list_awaiting_review(&state.db, limit).await?,
        Some("corrected") => records::list_corrected(&state.db, limit).await?,
        Some(other) => {
            return Err(ApiError::BadRequest(format!("Unknown filter: {}", other)));
        }
    };

    Ok(Json(list))
}

/// GET /api/residents/:guid/records
pub async fn list_by_resident(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
    Path(guid): Path<String>,
) -> ApiResult<Json<Vec<Record>>> {
    if residents::get_resident(&state.db, &guid).await?.is_none() {
        return Err(ApiError::NotFound(format!("Resident {}", guid)));
    }

    let limit = page_size(&state).await?;
    Ok(Json(records::list_by_resident(&state.db, &guid, limit).await?))
}

/// GET /api/teachers/:guid/records
pub async fn list_by_teacher(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
    Path(guid): Path<String>,
) -> ApiResult<Json<Vec<Record>>> {
    if teachers::get_teacher(&state.db, &guid).await?.is_none() {
        return Err(ApiError::NotFound(format!("Teacher {}", guid)));
    }

    let limit = page_size(&state).await?;
    Ok(Json(records::list_by_teacher(&state.db, &guid, limit).await?))
}

/// GET /api/records/:guid
///
/// A resident or teacher viewing a corrected record acknowledges it: the
/// record flips to `reviewed` before the response is built. Admin reads
/// leave the status alone.
pub async fn get_record(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(guid): Path<String>,
) -> ApiResult<Json<RecordDetail>> {
    if matches!(user.role, Role::Resident | Role::Teacher) {
        let acknowledged = records::acknowledge_corrected(&state.db, &guid).await?;
        if acknowledged {
            info!(
                "Record {} acknowledged as reviewed by '{}'",
                guid, user.username
            );
        }
    }

    records::get_record_detail(&state.db, &guid)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Record {}", guid)))
}

/// PUT /api/records/:guid (teacher or admin)
pub async fn update_record(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(guid): Path<String>,
    Json(payload): Json<UpdateRecordRequest>,
) -> ApiResult<Json<Record>> {
    require_admin_or(&user, Role::Teacher)?;

    if records::get_record(&state.db, &guid).await?.is_none() {
        return Err(ApiError::NotFound(format!("Record {}", guid)));
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
    if areas::get_area(&state.db, &payload.area_guid).await?.is_none() {
        return Err(ApiError::NotFound(format!("Area {}", payload.area_guid)));
    }

    records::update_record(
        &state.db,
        &guid,
        &payload.teacher_guid,
        &payload.area_guid,
        payload.performed_at,
    )
    .await?;

    records::get_record(&state.db, &guid)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Record {}", guid)))
}

/// DELETE /api/records/:guid (admin, soft delete)
pub async fn delete_record(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(guid): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    require_admin(&user)?;

    if records::get_record(&state.db, &guid).await?.is_none() {
        return Err(ApiError::NotFound(format!("Record {}", guid)));
    }

    records::soft_delete_record(&state.db, &guid).await?;
    info!("Record {} soft-deleted", guid);

    Ok(Json(serde_json::json!({ "success": true })))
}

/// POST /api/records/:guid/complete (resident, own record)
///
/// Writes judgment, comment and step evaluations. Does not assign a status.
pub async fn complete_record(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(guid): Path<String>,
    Json(payload): Json<CompleteRecordRequest>,
) -> ApiResult<Json<Record>> {
    require_role(&user, Role::Resident)?;

    let record = records::get_record(&state.db, &guid)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Record {}", guid)))?;

    if user.profile_guid.as_deref() != Some(record.resident_guid.as_str()) {
        return Err(ApiError::Forbidden(
            "Residents may only complete their own records".to_string(),
        ));
    }

    if payload.judgment.trim().is_empty() {
        return Err(ApiError::BadRequest("Judgment cannot be empty".to_string()));
    }

    records::complete_record(
        &state.db,
        &guid,
        payload.judgment.trim(),
        &payload.comment,
        &payload.step_evaluations,
    )
    .await?;
    info!("Record {} completed by '{}'", guid, user.username);

    records::get_record(&state.db, &guid)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Record {}", guid)))
}

/// POST /api/records/:guid/review (teacher)
///
/// Sets status to `reviewed` or `corrected`. There is no transition back to
/// draft, so `draft` is rejected outright.
pub async fn review_record(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(guid): Path<String>,
    Json(payload): Json<ReviewRecordRequest>,
) -> ApiResult<Json<Record>> {
    require_role(&user, Role::Teacher)?;

    if payload.status == RecordStatus::Draft {
        return Err(ApiError::BadRequest(
            "A record cannot return to draft".to_string(),
        ));
    }

    if records::get_record(&state.db, &guid).await?.is_none() {
        return Err(ApiError::NotFound(format!("Record {}", guid)));
    }

    records::review_record(
        &state.db,
        &guid,
        payload.status,
        payload.teacher_comment.as_deref(),
    )
    .await?;
    info!(
        "Record {} marked {} by '{}'",
        guid,
        payload.status.as_str(),
        user.username
    );

    records::get_record(&state.db, &guid)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Record {}", guid)))
}
