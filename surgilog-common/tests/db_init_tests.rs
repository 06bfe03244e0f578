//! Schema initialization tests

use surgilog_common::db::{self, settings};

#[tokio::test]
async fn schema_creates_all_tables() {
    let pool = db::connect_in_memory().await.expect("init in-memory db");

    let tables: Vec<(String,)> = sqlx::query_as(
        "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
    )
    .fetch_all(&pool)
    .await
    .expect("list tables");

    let names: Vec<&str> = tables.iter().map(|(n,)| n.as_str()).collect();

    for expected in [
        "area_residents",
        "area_teachers",
        "areas",
        "records",
        "residents",
        "sessions",
        "settings",
        "surgeries",
        "teachers",
        "users",
    ] {
        assert!(names.contains(&expected), "missing table {}", expected);
    }
}

#[tokio::test]
async fn init_is_idempotent() {
    let pool = db::connect_in_memory().await.expect("init in-memory db");

    // Second run must not fail or clobber settings
    settings::set_setting(&pool, "session_timeout_seconds", "123")
        .await
        .unwrap();
    db::init_schema(&pool).await.expect("re-init schema");

    let value = settings::get_setting_i64(&pool, "session_timeout_seconds", 0)
        .await
        .unwrap();
    assert_eq!(value, 123);
}

#[tokio::test]
async fn default_settings_seeded() {
    let pool = db::connect_in_memory().await.expect("init in-memory db");

    let timeout = settings::get_setting_i64(&pool, "session_timeout_seconds", 0)
        .await
        .unwrap();
    assert_eq!(timeout, 86400);

    let page_size = settings::get_setting_i64(&pool, "page_size", 0)
        .await
        .unwrap();
    assert_eq!(page_size, 100);
}

#[tokio::test]
async fn missing_setting_falls_back_to_default() {
    let pool = db::connect_in_memory().await.expect("init in-memory db");

    let value = settings::get_setting_i64(&pool, "no_such_key", 42)
        .await
        .unwrap();
    assert_eq!(value, 42);

    assert!(settings::get_setting(&pool, "no_such_key")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn file_database_created_on_connect() {
    let dir = tempfile::tempdir().expect("temp dir");
    let db_path = dir.path().join("surgilog.db");

    let pool = db::connect(&db_path).await.expect("connect");
    drop(pool);

    assert!(db_path.exists());
}
