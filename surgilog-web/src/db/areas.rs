//! Area database operations, including ordered membership lists
//!
//! Membership is an ordered list per area (position column). Adds are
//! idempotent: membership is checked by identity before appending at the
//! tail. Moving a resident between areas appends to the destination and then
//! removes from the origin - two steps, deliberately not wrapped in a
//! transaction, matching the documented non-atomic behavior.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use surgilog_common::models::{Area, AreaDetail, Resident, Teacher};
use surgilog_common::Result;

use super::residents::row_to_resident;
use super::teachers::row_to_teacher;
use super::{now_rfc3339, parse_timestamp};

fn row_to_area(row: &SqliteRow) -> Result<Area> {
    Ok(Area {
        guid: row.get("guid"),
        name: row.get("name"),
        description: row.get("description"),
        created_at: parse_timestamp("created_at", row.get::<String, _>("created_at").as_str())?,
        updated_at: parse_timestamp("updated_at", row.get::<String, _>("updated_at").as_str())?,
    })
}

pub async fn create_area(pool: &SqlitePool, name: &str, description: &str) -> Result<Area> {
    let guid = Uuid::new_v4().to_string();
    let now = now_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO areas (guid, name, description, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&guid)
    .bind(name)
    .bind(description)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    get_area(pool, &guid)
        .await?
        .ok_or_else(|| surgilog_common::Error::Internal("Area vanished after insert".to_string()))
}

/// Fetch an area by guid (soft-deleted rows are invisible)
pub async fn get_area(pool: &SqlitePool, guid: &str) -> Result<Option<Area>> {
    let row = sqlx::query("SELECT * FROM areas WHERE guid = ? AND deleted = 0")
        .bind(guid)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(row_to_area).transpose()
}

pub async fn list_areas(pool: &SqlitePool) -> Result<Vec<Area>> {
    let rows = sqlx::query("SELECT * FROM areas WHERE deleted = 0 ORDER BY name")
        .fetch_all(pool)
        .await?;

    rows.iter().map(row_to_area).collect()
}

pub async fn update_area(
    pool: &SqlitePool,
    guid: &str,
    name: &str,
    description: &str,
) -> Result<()> {
    sqlx::query(
        "UPDATE areas SET name = ?, description = ?, updated_at = ? WHERE guid = ? AND deleted = 0",
    )
    .bind(name)
    .bind(description)
    .bind(now_rfc3339())
    .bind(guid)
    .execute(pool)
    .await?;

    Ok(())
}

/// Soft delete: the row stays, the flag never goes back
pub async fn soft_delete_area(pool: &SqlitePool, guid: &str) -> Result<()> {
    sqlx::query("UPDATE areas SET deleted = 1, updated_at = ? WHERE guid = ?")
        .bind(now_rfc3339())
        .bind(guid)
        .execute(pool)
        .await?;

    Ok(())
}

/// Area with its ordered resident and teacher lists populated
pub async fn get_area_detail(pool: &SqlitePool, guid: &str) -> Result<Option<AreaDetail>> {
    let Some(area) = get_area(pool, guid).await? else {
        return Ok(None);
    };

    let residents = area_residents(pool, guid).await?;
    let teachers = area_teachers(pool, guid).await?;

    Ok(Some(AreaDetail {
        area,
        residents,
        teachers,
    }))
}

/// Ordered resident list for an area
pub async fn area_residents(pool: &SqlitePool, area_guid: &str) -> Result<Vec<Resident>> {
    let rows = sqlx::query(
        r#"
        SELECT r.* FROM residents r
        JOIN area_residents ar ON ar.resident_guid = r.guid
        WHERE ar.area_guid = ? AND r.deleted = 0
        ORDER BY ar.position
        "#,
    )
    .bind(area_guid)
    .fetch_all(pool)
    .await?;

    rows.iter().map(row_to_resident).collect()
}

/// Ordered teacher list for an area
pub async fn area_teachers(pool: &SqlitePool, area_guid: &str) -> Result<Vec<Teacher>> {
    let rows = sqlx::query(
        r#"
        SELECT t.* FROM teachers t
        JOIN area_teachers at ON at.teacher_guid = t.guid
        WHERE at.area_guid = ? AND t.deleted = 0
        ORDER BY at.position
        "#,
    )
    .bind(area_guid)
    .fetch_all(pool)
    .await?;

    rows.iter().map(row_to_teacher).collect()
}

/// Idempotently append a resident to an area's list
///
/// Membership is checked by identity first; an existing member keeps its
/// position and the call is a no-op.
pub async fn add_resident_to_area(
    pool: &SqlitePool,
    area_guid: &str,
    resident_guid: &str,
) -> Result<()> {
    let exists: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM area_residents WHERE area_guid = ? AND resident_guid = ?",
    )
    .bind(area_guid)
    .bind(resident_guid)
    .fetch_one(pool)
    .await?;

    if exists > 0 {
        return Ok(());
    }

    let next_position: i64 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(position) + 1, 0) FROM area_residents WHERE area_guid = ?",
    )
    .bind(area_guid)
    .fetch_one(pool)
    .await?;

    sqlx::query(
        "INSERT INTO area_residents (area_guid, resident_guid, position) VALUES (?, ?, ?)",
    )
    .bind(area_guid)
    .bind(resident_guid)
    .bind(next_position)
    .execute(pool)
    .await?;

    Ok(())
}

/// Idempotently append a teacher to an area's list
pub async fn add_teacher_to_area(
    pool: &SqlitePool,
    area_guid: &str,
    teacher_guid: &str,
) -> Result<()> {
    let exists: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM area_teachers WHERE area_guid = ? AND teacher_guid = ?",
    )
    .bind(area_guid)
    .bind(teacher_guid)
    .fetch_one(pool)
    .await?;

    if exists > 0 {
        return Ok(());
    }

    let next_position: i64 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(position) + 1, 0) FROM area_teachers WHERE area_guid = ?",
    )
    .bind(area_guid)
    .fetch_one(pool)
    .await?;

    sqlx::query("INSERT INTO area_teachers (area_guid, teacher_guid, position) VALUES (?, ?, ?)")
        .bind(area_guid)
        .bind(teacher_guid)
        .bind(next_position)
        .execute(pool)
        .await?;

    Ok(())
}

/// Move a resident from one area to another
///
/// Appends to the destination list, then removes from the origin list. Two
/// separate statements with no rollback if the second fails.
pub async fn move_resident(
    pool: &SqlitePool,
    resident_guid: &str,
    from_area_guid: &str,
    to_area_guid: &str,
) -> Result<()> {
    add_resident_to_area(pool, to_area_guid, resident_guid).await?;

    sqlx::query("DELETE FROM area_residents WHERE area_guid = ? AND resident_guid = ?")
        .bind(from_area_guid)
        .bind(resident_guid)
        .execute(pool)
        .await?;

    Ok(())
}
