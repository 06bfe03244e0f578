//! Surgery template database operations
//!
//! Steps are stored as a JSON array in a TEXT column.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use surgilog_common::models::Surgery;
use surgilog_common::{Error, Result};

use super::{now_rfc3339, parse_timestamp};

fn row_to_surgery(row: &SqliteRow) -> Result<Surgery> {
    let steps: String = row.get("steps");
    let steps: Vec<String> = serde_json::from_str(&steps)?;

    Ok(Surgery {
        guid: row.get("guid"),
        name: row.get("name"),
        description: row.get("description"),
        steps,
        guidelines: row.get("guidelines"),
        created_at: parse_timestamp("created_at", row.get::<String, _>("created_at").as_str())?,
        updated_at: parse_timestamp("updated_at", row.get::<String, _>("updated_at").as_str())?,
    })
}

pub async fn create_surgery(
    pool: &SqlitePool,
    name: &str,
    description: &str,
    steps: &[String],
    guidelines: &str,
) -> Result<Surgery> {
    let guid = Uuid::new_v4().to_string();
    let now = now_rfc3339();
    let steps_json = serde_json::to_string(steps)?;

    sqlx::query(
        r#"
        INSERT INTO surgeries (guid, name, description, steps, guidelines, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&guid)
    .bind(name)
    .bind(description)
    .bind(&steps_json)
    .bind(guidelines)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    get_surgery(pool, &guid)
        .await?
        .ok_or_else(|| Error::Internal("Surgery vanished after insert".to_string()))
}

/// Fetch a surgery by guid (soft-deleted rows are invisible)
pub async fn get_surgery(pool: &SqlitePool, guid: &str) -> Result<Option<Surgery>> {
    let row = sqlx::query("SELECT * FROM surgeries WHERE guid = ? AND deleted = 0")
        .bind(guid)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(row_to_surgery).transpose()
}

pub async fn list_surgeries(pool: &SqlitePool) -> Result<Vec<Surgery>> {
    let rows = sqlx::query("SELECT * FROM surgeries WHERE deleted = 0 ORDER BY name")
        .fetch_all(pool)
        .await?;

    rows.iter().map(row_to_surgery).collect()
}

pub async fn update_surgery(
    pool: &SqlitePool,
    guid: &str,
    name: &str,
    description: &str,
    steps: &[String],
    guidelines: &str,
) -> Result<()> {
    let steps_json = serde_json::to_string(steps)?;

    sqlx::query(
        r#"
        UPDATE surgeries SET name = ?, description = ?, steps = ?, guidelines = ?, updated_at = ?
        WHERE guid = ? AND deleted = 0
        "#,
    )
    .bind(name)
    .bind(description)
    .bind(&steps_json)
    .bind(guidelines)
    .bind(now_rfc3339())
    .bind(guid)
    .execute(pool)
    .await?;

    Ok(())
}

/// Soft delete: the row stays, the flag never goes back
pub async fn soft_delete_surgery(pool: &SqlitePool, guid: &str) -> Result<()> {
    sqlx::query("UPDATE surgeries SET deleted = 1, updated_at = ? WHERE guid = ?")
        .bind(now_rfc3339())
        .bind(guid)
        .execute(pool)
        .await?;

    Ok(())
}
