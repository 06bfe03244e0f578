//! Teacher database operations

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use surgilog_common::models::Teacher;
use surgilog_common::Result;

use super::{now_rfc3339, parse_timestamp};

pub(crate) fn row_to_teacher(row: &SqliteRow) -> Result<Teacher> {
    Ok(Teacher {
        guid: row.get("guid"),
        name: row.get("name"),
        email: row.get("email"),
        created_at: parse_timestamp("created_at", row.get::<String, _>("created_at").as_str())?,
        updated_at: parse_timestamp("updated_at", row.get::<String, _>("updated_at").as_str())?,
    })
}

pub async fn create_teacher(pool: &SqlitePool, name: &str, email: &str) -> Result<Teacher> {
    let guid = Uuid::new_v4().to_string();
    let now = now_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO teachers (guid, name, email, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&guid)
    .bind(name)
    .bind(email)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    get_teacher(pool, &guid).await?.ok_or_else(|| {
        surgilog_common::Error::Internal("Teacher vanished after insert".to_string())
    })
}

/// Fetch a teacher by guid (soft-deleted rows are invisible)
pub async fn get_teacher(pool: &SqlitePool, guid: &str) -> Result<Option<Teacher>> {
    let row = sqlx::query("SELECT * FROM teachers WHERE guid = ? AND deleted = 0")
        .bind(guid)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(row_to_teacher).transpose()
}

pub async fn list_teachers(pool: &SqlitePool) -> Result<Vec<Teacher>> {
    let rows = sqlx::query("SELECT * FROM teachers WHERE deleted = 0 ORDER BY name")
        .fetch_all(pool)
        .await?;

    rows.iter().map(row_to_teacher).collect()
}

pub async fn update_teacher(
    pool: &SqlitePool,
    guid: &str,
    name: &str,
    email: &str,
) -> Result<()> {
    sqlx::query(
        "UPDATE teachers SET name = ?, email = ?, updated_at = ? WHERE guid = ? AND deleted = 0",
    )
    .bind(name)
    .bind(email)
    .bind(now_rfc3339())
    .bind(guid)
    .execute(pool)
    .await?;

    Ok(())
}

/// Soft delete a teacher and pull them from every area's teacher list
///
/// The membership pull is a single statement across all areas.
pub async fn soft_delete_teacher(pool: &SqlitePool, guid: &str) -> Result<()> {
    sqlx::query("UPDATE teachers SET deleted = 1, updated_at = ? WHERE guid = ?")
        .bind(now_rfc3339())
        .bind(guid)
        .execute(pool)
        .await?;

    sqlx::query("DELETE FROM area_teachers WHERE teacher_guid = ?")
        .bind(guid)
        .execute(pool)
        .await?;

    Ok(())
}
