//! Resident database operations

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use surgilog_common::models::Resident;
use surgilog_common::Result;

use super::{now_rfc3339, parse_timestamp};

pub(crate) fn row_to_resident(row: &SqliteRow) -> Result<Resident> {
    Ok(Resident {
        guid: row.get("guid"),
        name: row.get("name"),
        email: row.get("email"),
        training_year: row.get("training_year"),
        created_at: parse_timestamp("created_at", row.get::<String, _>("created_at").as_str())?,
        updated_at: parse_timestamp("updated_at", row.get::<String, _>("updated_at").as_str())?,
    })
}

pub async fn create_resident(
    pool: &SqlitePool,
    name: &str,
    email: &str,
    training_year: i64,
) -> Result<Resident> {
    let guid = Uuid::new_v4().to_string();
    let now = now_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO residents (guid, name, email, training_year, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&guid)
    .bind(name)
    .bind(email)
    .bind(training_year)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    get_resident(pool, &guid).await?.ok_or_else(|| {
        surgilog_common::Error::Internal("Resident vanished after insert".to_string())
    })
}

/// Fetch a resident by guid (soft-deleted rows are invisible)
pub async fn get_resident(pool: &SqlitePool, guid: &str) -> Result<Option<Resident>> {
    let row = sqlx::query("SELECT * FROM residents WHERE guid = ? AND deleted = 0")
        .bind(guid)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(row_to_resident).transpose()
}

pub async fn list_residents(pool: &SqlitePool) -> Result<Vec<Resident>> {
    let rows = sqlx::query("SELECT * FROM residents WHERE deleted = 0 ORDER BY name")
        .fetch_all(pool)
        .await?;

    rows.iter().map(row_to_resident).collect()
}

pub async fn update_resident(
    pool: &SqlitePool,
    guid: &str,
    name: &str,
    email: &str,
    training_year: i64,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE residents SET name = ?, email = ?, training_year = ?, updated_at = ?
        WHERE guid = ? AND deleted = 0
        "#,
    )
    .bind(name)
    .bind(email)
    .bind(training_year)
    .bind(now_rfc3339())
    .bind(guid)
    .execute(pool)
    .await?;

    Ok(())
}

/// Soft delete: the row stays, the flag never goes back
pub async fn soft_delete_resident(pool: &SqlitePool, guid: &str) -> Result<()> {
    sqlx::query("UPDATE residents SET deleted = 1, updated_at = ? WHERE guid = ?")
        .bind(now_rfc3339())
        .bind(guid)
        .execute(pool)
        .await?;

    Ok(())
}
