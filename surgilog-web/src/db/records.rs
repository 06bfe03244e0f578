//! Record database operations and the review lifecycle
//!
//! A record is one performance of a surgery by a resident. It is created with
//! no status; completing it (resident) fills in judgment, comment and step
//! evaluations without touching status; reviewing it (teacher) sets status to
//! `reviewed` or `corrected`. A corrected record flips to `reviewed` when a
//! resident or teacher next reads it - see `acknowledge_corrected`. There is
//! no transition back to draft.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use surgilog_common::models::{Record, RecordDetail, RecordStatus, StepEvaluation};
use surgilog_common::{Error, Result};

use super::{now_rfc3339, parse_timestamp};

fn row_to_record(row: &SqliteRow) -> Result<Record> {
    let status: Option<String> = row.get("status");
    let status = status.as_deref().map(RecordStatus::parse).transpose()?;

    let evaluations: String = row.get("step_evaluations");
    let step_evaluations: Vec<StepEvaluation> = serde_json::from_str(&evaluations)?;

    Ok(Record {
        guid: row.get("guid"),
        surgery_guid: row.get("surgery_guid"),
        resident_guid: row.get("resident_guid"),
        teacher_guid: row.get("teacher_guid"),
        area_guid: row.get("area_guid"),
        performed_at: parse_timestamp("performed_at", row.get::<String, _>("performed_at").as_str())?,
        status,
        judgment: row.get("judgment"),
        comment: row.get("comment"),
        step_evaluations,
        teacher_comment: row.get("teacher_comment"),
        created_at: parse_timestamp("created_at", row.get::<String, _>("created_at").as_str())?,
        updated_at: parse_timestamp("updated_at", row.get::<String, _>("updated_at").as_str())?,
    })
}

/// Create a record; no status is assigned at creation
pub async fn create_record(
    pool: &SqlitePool,
    surgery_guid: &str,
    resident_guid: &str,
    teacher_guid: &str,
    area_guid: &str,
    performed_at: DateTime<Utc>,
) -> Result<Record> {
    let guid = Uuid::new_v4().to_string();
    let now = now_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO records (guid, surgery_guid, resident_guid, teacher_guid, area_guid,
                             performed_at, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&guid)
    .bind(surgery_guid)
    .bind(resident_guid)
    .bind(teacher_guid)
    .bind(area_guid)
    .bind(performed_at.to_rfc3339())
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    get_record(pool, &guid)
        .await?
        .ok_or_else(|| Error::Internal("Record vanished after insert".to_string()))
}

/// Fetch a record by guid (soft-deleted rows are invisible)
pub async fn get_record(pool: &SqlitePool, guid: &str) -> Result<Option<Record>> {
    let row = sqlx::query("SELECT * FROM records WHERE guid = ? AND deleted = 0")
        .bind(guid)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(row_to_record).transpose()
}

/// Record with related surgery, resident, teacher and area names populated
pub async fn get_record_detail(pool: &SqlitePool, guid: &str) -> Result<Option<RecordDetail>> {
    let row = sqlx::query(
        r#"
        SELECT rec.*,
               s.name AS surgery_name,
               r.name AS resident_name,
               t.name AS teacher_name,
               a.name AS area_name
        FROM records rec
        JOIN surgeries s ON s.guid = rec.surgery_guid
        JOIN residents r ON r.guid = rec.resident_guid
        JOIN teachers t ON t.guid = rec.teacher_guid
        JOIN areas a ON a.guid = rec.area_guid
        WHERE rec.guid = ? AND rec.deleted = 0
        "#,
    )
    .bind(guid)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    Ok(Some(RecordDetail {
        record: row_to_record(&row)?,
        surgery_name: row.get("surgery_name"),
        resident_name: row.get("resident_name"),
        teacher_name: row.get("teacher_name"),
        area_name: row.get("area_name"),
    }))
}

/// Newest records first, capped at `limit` rows
pub async fn list_records(pool: &SqlitePool, limit: i64) -> Result<Vec<Record>> {
    let rows = sqlx::query(
        "SELECT * FROM records WHERE deleted = 0 ORDER BY performed_at DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.iter().map(row_to_record).collect()
}

pub async fn list_by_resident(
    pool: &SqlitePool,
    resident_guid: &str,
    limit: i64,
) -> Result<Vec<Record>> {
    let rows = sqlx::query(
        "SELECT * FROM records WHERE resident_guid = ? AND deleted = 0 ORDER BY performed_at DESC LIMIT ?",
    )
    .bind(resident_guid)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.iter().map(row_to_record).collect()
}

pub async fn list_by_teacher(
    pool: &SqlitePool,
    teacher_guid: &str,
    limit: i64,
) -> Result<Vec<Record>> {
    let rows = sqlx::query(
        "SELECT * FROM records WHERE teacher_guid = ? AND deleted = 0 ORDER BY performed_at DESC LIMIT ?",
    )
    .bind(teacher_guid)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.iter().map(row_to_record).collect()
}

/// Records no teacher has acted on yet (status unassigned)
pub async fn list_awaiting_review(pool: &SqlitePool, limit: i64) -> Result<Vec<Record>> {
    let rows = sqlx::query(
        "SELECT * FROM records WHERE status IS NULL AND deleted = 0 ORDER BY performed_at DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.iter().map(row_to_record).collect()
}

/// Corrected records not yet acknowledged by a read
pub async fn list_corrected(pool: &SqlitePool, limit: i64) -> Result<Vec<Record>> {
    let rows = sqlx::query(
        "SELECT * FROM records WHERE status = 'corrected' AND deleted = 0 ORDER BY performed_at DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.iter().map(row_to_record).collect()
}

/// Resident completion: judgment, comment and step evaluations
///
/// Does not assign a status.
pub async fn complete_record(
    pool: &SqlitePool,
    guid: &str,
    judgment: &str,
    comment: &str,
    step_evaluations: &[StepEvaluation],
) -> Result<()> {
    let evaluations_json = serde_json::to_string(step_evaluations)?;

    sqlx::query(
        r#"
        UPDATE records SET judgment = ?, comment = ?, step_evaluations = ?, updated_at = ?
        WHERE guid = ? AND deleted = 0
        "#,
    )
    .bind(judgment)
    .bind(comment)
    .bind(&evaluations_json)
    .bind(now_rfc3339())
    .bind(guid)
    .execute(pool)
    .await?;

    Ok(())
}

/// Teacher review: sets status to `reviewed` or `corrected`
pub async fn review_record(
    pool: &SqlitePool,
    guid: &str,
    status: RecordStatus,
    teacher_comment: Option<&str>,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE records SET status = ?, teacher_comment = COALESCE(?, teacher_comment), updated_at = ?
        WHERE guid = ? AND deleted = 0
        "#,
    )
    .bind(status.as_str())
    .bind(teacher_comment)
    .bind(now_rfc3339())
    .bind(guid)
    .execute(pool)
    .await?;

    Ok(())
}

/// Flip a corrected record to reviewed (the read-side acknowledgement)
///
/// Returns whether the record actually transitioned; a record in any other
/// state is untouched.
pub async fn acknowledge_corrected(pool: &SqlitePool, guid: &str) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE records SET status = 'reviewed', updated_at = ? WHERE guid = ? AND status = 'corrected' AND deleted = 0",
    )
    .bind(now_rfc3339())
    .bind(guid)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Update the scheduling fields of a record
pub async fn update_record(
    pool: &SqlitePool,
    guid: &str,
    teacher_guid: &str,
    area_guid: &str,
    performed_at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE records SET teacher_guid = ?, area_guid = ?, performed_at = ?, updated_at = ?
        WHERE guid = ? AND deleted = 0
        "#,
    )
    .bind(teacher_guid)
    .bind(area_guid)
    .bind(performed_at.to_rfc3339())
    .bind(now_rfc3339())
    .bind(guid)
    .execute(pool)
    .await?;

    Ok(())
}

/// Soft delete: the row stays, the flag never goes back
pub async fn soft_delete_record(pool: &SqlitePool, guid: &str) -> Result<()> {
    sqlx::query("UPDATE records SET deleted = 1, updated_at = ? WHERE guid = ?")
        .bind(now_rfc3339())
        .bind(guid)
        .execute(pool)
        .await?;

    Ok(())
}
