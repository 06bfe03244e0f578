//! Session database operations
//!
//! A session row backs each login token. Expiry comes from the
//! `session_timeout_seconds` setting at login time; expired rows are removed
//! on sight and swept at startup.

use chrono::{Duration, Utc};
use sqlx::{Row, SqlitePool};

use surgilog_common::auth::generate_session_token;
use surgilog_common::db::settings::get_setting_i64;
use surgilog_common::models::Session;
use surgilog_common::Result;

use super::{now_rfc3339, parse_timestamp};

const DEFAULT_TIMEOUT_SECONDS: i64 = 86400;
const DEFAULT_CLEANUP_INTERVAL_SECONDS: i64 = 3600;

/// Create a session for the user, honoring `session_timeout_seconds`
pub async fn create_session(pool: &SqlitePool, user_guid: &str) -> Result<Session> {
    let timeout =
        get_setting_i64(pool, "session_timeout_seconds", DEFAULT_TIMEOUT_SECONDS).await?;

    let token = generate_session_token();
    let created_at = Utc::now();
    let expires_at = created_at + Duration::seconds(timeout);

    sqlx::query(
        "INSERT INTO sessions (token, user_guid, created_at, expires_at) VALUES (?, ?, ?, ?)",
    )
    .bind(&token)
    .bind(user_guid)
    .bind(created_at.to_rfc3339())
    .bind(expires_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(Session {
        token,
        user_guid: user_guid.to_string(),
        created_at,
        expires_at,
    })
}

/// Look up a session by token
///
/// An expired session is deleted and reported as absent.
pub async fn get_session(pool: &SqlitePool, token: &str) -> Result<Option<Session>> {
    let row = sqlx::query("SELECT * FROM sessions WHERE token = ?")
        .bind(token)
        .fetch_optional(pool)
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let session = Session {
        token: row.get("token"),
        user_guid: row.get("user_guid"),
        created_at: parse_timestamp("created_at", row.get::<String, _>("created_at").as_str())?,
        expires_at: parse_timestamp("expires_at", row.get::<String, _>("expires_at").as_str())?,
    };

    if session.expires_at <= Utc::now() {
        delete_session(pool, token).await?;
        return Ok(None);
    }

    Ok(Some(session))
}

/// Delete a session (logout)
pub async fn delete_session(pool: &SqlitePool, token: &str) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await?;

    Ok(())
}

/// Sweep interval for the background cleanup task, honoring
/// `session_cleanup_interval_seconds`
pub async fn cleanup_interval(pool: &SqlitePool) -> Result<std::time::Duration> {
    let seconds = get_setting_i64(
        pool,
        "session_cleanup_interval_seconds",
        DEFAULT_CLEANUP_INTERVAL_SECONDS,
    )
    .await?;

    Ok(std::time::Duration::from_secs(seconds.max(1) as u64))
}

/// Remove all expired sessions, returning how many were removed
pub async fn cleanup_expired(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
        .bind(now_rfc3339())
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
