//! User account database operations

use sqlx::{Row, SqlitePool};
use sqlx::sqlite::SqliteRow;
use uuid::Uuid;

use surgilog_common::auth::{generate_salt, generate_session_token, hash_password};
use surgilog_common::models::{Role, User};
use surgilog_common::{Error, Result};

use super::{now_rfc3339, parse_timestamp};

fn row_to_user(row: &SqliteRow) -> Result<User> {
    Ok(User {
        guid: row.get("guid"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        password_salt: row.get("password_salt"),
        role: Role::parse(row.get::<String, _>("role").as_str())?,
        profile_guid: row.get("profile_guid"),
        created_at: parse_timestamp("created_at", row.get::<String, _>("created_at").as_str())?,
        updated_at: parse_timestamp("updated_at", row.get::<String, _>("updated_at").as_str())?,
    })
}

/// Create a user with a freshly salted password hash
///
/// A duplicate username surfaces as [`Error::Conflict`].
pub async fn create_user(
    pool: &SqlitePool,
    username: &str,
    password: &str,
    role: Role,
    profile_guid: Option<&str>,
) -> Result<User> {
    let guid = Uuid::new_v4().to_string();
    let salt = generate_salt();
    let hash = hash_password(password, &salt);
    let now = now_rfc3339();

    let result = sqlx::query(
        r#"
        INSERT INTO users (guid, username, password_hash, password_salt, role, profile_guid, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&guid)
    .bind(username)
    .bind(&hash)
    .bind(&salt)
    .bind(role.as_str())
    .bind(profile_guid)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await;

    if let Err(e) = result {
        if matches!(&e, sqlx::Error::Database(db) if db.is_unique_violation()) {
            return Err(Error::Conflict(format!(
                "Username '{}' already exists",
                username
            )));
        }
        return Err(e.into());
    }

    get_user(pool, &guid)
        .await?
        .ok_or_else(|| Error::Internal("User vanished after insert".to_string()))
}

/// Fetch a user by guid
pub async fn get_user(pool: &SqlitePool, guid: &str) -> Result<Option<User>> {
    let row = sqlx::query("SELECT * FROM users WHERE guid = ?")
        .bind(guid)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(row_to_user).transpose()
}

/// Fetch a user by username
pub async fn get_user_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>> {
    let row = sqlx::query("SELECT * FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(row_to_user).transpose()
}

/// List all users
pub async fn list_users(pool: &SqlitePool) -> Result<Vec<User>> {
    let rows = sqlx::query("SELECT * FROM users ORDER BY username")
        .fetch_all(pool)
        .await?;

    rows.iter().map(row_to_user).collect()
}

/// Update a user's role and profile link
pub async fn update_user(
    pool: &SqlitePool,
    guid: &str,
    role: Role,
    profile_guid: Option<&str>,
) -> Result<()> {
    sqlx::query("UPDATE users SET role = ?, profile_guid = ?, updated_at = ? WHERE guid = ?")
        .bind(role.as_str())
        .bind(profile_guid)
        .bind(now_rfc3339())
        .bind(guid)
        .execute(pool)
        .await?;

    Ok(())
}

/// Reset a user's password (new salt, new hash)
pub async fn reset_password(pool: &SqlitePool, guid: &str, password: &str) -> Result<()> {
    let salt = generate_salt();
    let hash = hash_password(password, &salt);

    sqlx::query(
        "UPDATE users SET password_hash = ?, password_salt = ?, updated_at = ? WHERE guid = ?",
    )
    .bind(&hash)
    .bind(&salt)
    .bind(now_rfc3339())
    .bind(guid)
    .execute(pool)
    .await?;

    Ok(())
}

/// Remove a user and all of its sessions
///
/// Users are not soft-deleted; the row and its sessions go away together.
pub async fn delete_user(pool: &SqlitePool, guid: &str) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE user_guid = ?")
        .bind(guid)
        .execute(pool)
        .await?;

    sqlx::query("DELETE FROM users WHERE guid = ?")
        .bind(guid)
        .execute(pool)
        .await?;

    Ok(())
}

/// Count all users
pub async fn count_users(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// Create the initial admin account when the users table is empty
///
/// Returns the generated password so startup can log it once; returns `None`
/// when any user already exists.
pub async fn bootstrap_admin(pool: &SqlitePool) -> Result<Option<String>> {
    if count_users(pool).await? > 0 {
        return Ok(None);
    }

    let password = generate_session_token();
    create_user(pool, "admin", &password, Role::Admin, None).await?;

    Ok(Some(password))
}
