//! Record lifecycle tests
//!
//! Covers the full review flow: creation with no status, resident
//! completion, teacher review/correction, and the read-side
//! corrected-to-reviewed acknowledgement.

mod helpers;

use axum::http::StatusCode;
use helpers::{create_login, send, setup_app};
use serde_json::json;
use sqlx::SqlitePool;

use surgilog_common::models::Role;
use surgilog_web::db;

struct Scenario {
    admin_token: String,
    teacher_token: String,
    resident_token: String,
    record_guid: String,
    resident_guid: String,
    teacher_guid: String,
    area_guid: String,
    surgery_guid: String,
}

/// One area, one surgery, one resident+teacher pair with logins, one record
async fn setup_scenario(app: &axum::Router, pool: &SqlitePool) -> Scenario {
    let resident = db::residents::create_resident(pool, "Alice Vega", "alice@example.org", 2)
        .await
        .unwrap();
    let teacher = db::teachers::create_teacher(pool, "Dr. Braun", "braun@example.org")
        .await
        .unwrap();
    let area = db::areas::create_area(pool, "General Surgery", "")
        .await
        .unwrap();
    let surgery = db::surgeries::create_surgery(
        pool,
        "Appendectomy",
        "",
        &["incision".to_string(), "closure".to_string()],
        "Grade 1-5",
    )
    .await
    .unwrap();

    let admin_token = create_login(app, pool, "root", Role::Admin, None).await;
    let teacher_token =
        create_login(app, pool, "braun", Role::Teacher, Some(&teacher.guid)).await;
    let resident_token =
        create_login(app, pool, "alice", Role::Resident, Some(&resident.guid)).await;

    let (status, record) = send(
        app,
        "POST",
        "/api/records",
        Some(&teacher_token),
        Some(json!({
            "surgery_guid": surgery.guid,
            "resident_guid": resident.guid,
            "teacher_guid": teacher.guid,
            "area_guid": area.guid,
            "performed_at": "2026-08-20T09:30:00Z"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "record creation failed: {}", record);

    Scenario {
        admin_token,
        teacher_token,
        resident_token,
        record_guid: record["guid"].as_str().unwrap().to_string(),
        resident_guid: resident.guid,
        teacher_guid: teacher.guid,
        area_guid: area.guid,
        surgery_guid: surgery.guid,
    }
}

#[tokio::test]
async fn new_record_has_no_status() {
    let (app, pool) = setup_app().await;
    let s = setup_scenario(&app, &pool).await;

    let record = db::records::get_record(&pool, &s.record_guid)
        .await
        .unwrap()
        .unwrap();
    assert!(record.status.is_none());
}

#[tokio::test]
async fn resident_cannot_create_records() {
    let (app, pool) = setup_app().await;
    let s = setup_scenario(&app, &pool).await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/records",
        Some(&s.resident_token),
        Some(json!({
            "surgery_guid": "x",
            "resident_guid": "x",
            "teacher_guid": "x",
            "area_guid": "x",
            "performed_at": "2026-08-20T09:30:00Z"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn completion_fills_fields_without_assigning_status() {
    let (app, pool) = setup_app().await;
    let s = setup_scenario(&app, &pool).await;

    let (status, record) = send(
        &app,
        "POST",
        &format!("/api/records/{}/complete", s.record_guid),
        Some(&s.resident_token),
        Some(json!({
            "judgment": "Uncomplicated",
            "comment": "First solo closure",
            "step_evaluations": [
                { "step": "incision", "grade": 4 },
                { "step": "closure", "grade": 3, "note": "slow but clean" }
            ]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["judgment"], "Uncomplicated");
    assert_eq!(record["status"], serde_json::Value::Null);
    assert_eq!(record["step_evaluations"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn completion_requires_owning_resident() {
    let (app, pool) = setup_app().await;
    let s = setup_scenario(&app, &pool).await;

    // A different resident with their own login
    let other = db::residents::create_resident(&pool, "Bob Lane", "", 1)
        .await
        .unwrap();
    let other_token = create_login(&app, &pool, "bob", Role::Resident, Some(&other.guid)).await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/records/{}/complete", s.record_guid),
        Some(&other_token),
        Some(json!({ "judgment": "Fine" })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn completion_rejects_empty_judgment() {
    let (app, pool) = setup_app().await;
    let s = setup_scenario(&app, &pool).await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/records/{}/complete", s.record_guid),
        Some(&s.resident_token),
        Some(json!({ "judgment": "  " })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn teacher_review_sets_status() {
    let (app, pool) = setup_app().await;
    let s = setup_scenario(&app, &pool).await;

    let (status, record) = send(
        &app,
        "POST",
        &format!("/api/records/{}/review", s.record_guid),
        Some(&s.teacher_token),
        Some(json!({ "status": "corrected", "teacher_comment": "Redo suture spacing" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["status"], "corrected");
    assert_eq!(record["teacher_comment"], "Redo suture spacing");
}

#[tokio::test]
async fn review_rejects_draft_target() {
    let (app, pool) = setup_app().await;
    let s = setup_scenario(&app, &pool).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/records/{}/review", s.record_guid),
        Some(&s.teacher_token),
        Some(json!({ "status": "draft" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn resident_cannot_review() {
    let (app, pool) = setup_app().await;
    let s = setup_scenario(&app, &pool).await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/records/{}/review", s.record_guid),
        Some(&s.resident_token),
        Some(json!({ "status": "reviewed" })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn resident_view_acknowledges_corrected_record() {
    let (app, pool) = setup_app().await;
    let s = setup_scenario(&app, &pool).await;

    send(
        &app,
        "POST",
        &format!("/api/records/{}/review", s.record_guid),
        Some(&s.teacher_token),
        Some(json!({ "status": "corrected" })),
    )
    .await;

    // The read itself performs the transition; the response already shows it
    let (status, detail) = send(
        &app,
        "GET",
        &format!("/api/records/{}", s.record_guid),
        Some(&s.resident_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["status"], "reviewed");

    // And it is durable
    let record = db::records::get_record(&pool, &s.record_guid)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        record.status,
        Some(surgilog_common::models::RecordStatus::Reviewed)
    );
}

#[tokio::test]
async fn admin_view_does_not_acknowledge() {
    let (app, pool) = setup_app().await;
    let s = setup_scenario(&app, &pool).await;

    send(
        &app,
        "POST",
        &format!("/api/records/{}/review", s.record_guid),
        Some(&s.teacher_token),
        Some(json!({ "status": "corrected" })),
    )
    .await;

    let (status, detail) = send(
        &app,
        "GET",
        &format!("/api/records/{}", s.record_guid),
        Some(&s.admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["status"], "corrected");
}

#[tokio::test]
async fn reviewed_record_stays_reviewed_on_view() {
    let (app, pool) = setup_app().await;
    let s = setup_scenario(&app, &pool).await;

    send(
        &app,
        "POST",
        &format!("/api/records/{}/review", s.record_guid),
        Some(&s.teacher_token),
        Some(json!({ "status": "reviewed" })),
    )
    .await;

    let (_, detail) = send(
        &app,
        "GET",
        &format!("/api/records/{}", s.record_guid),
        Some(&s.resident_token),
        None,
    )
    .await;
    assert_eq!(detail["status"], "reviewed");
}

#[tokio::test]
async fn record_detail_populates_related_names() {
    let (app, pool) = setup_app().await;
    let s = setup_scenario(&app, &pool).await;

    let (_, detail) = send(
        &app,
        "GET",
        &format!("/api/records/{}", s.record_guid),
        Some(&s.admin_token),
        None,
    )
    .await;

    assert_eq!(detail["surgery_name"], "Appendectomy");
    assert_eq!(detail["resident_name"], "Alice Vega");
    assert_eq!(detail["teacher_name"], "Dr. Braun");
    assert_eq!(detail["area_name"], "General Surgery");
}

#[tokio::test]
async fn record_filters_track_lifecycle() {
    let (app, pool) = setup_app().await;
    let s = setup_scenario(&app, &pool).await;

    // Fresh record: awaiting review
    let (_, awaiting) = send(
        &app,
        "GET",
        "/api/records?filter=awaiting-review",
        Some(&s.admin_token),
        None,
    )
    .await;
    assert_eq!(awaiting.as_array().unwrap().len(), 1);

    // Corrected: leaves the awaiting list, appears in the corrected list
    send(
        &app,
        "POST",
        &format!("/api/records/{}/review", s.record_guid),
        Some(&s.teacher_token),
        Some(json!({ "status": "corrected" })),
    )
    .await;

    let (_, awaiting) = send(
        &app,
        "GET",
        "/api/records?filter=awaiting-review",
        Some(&s.admin_token),
        None,
    )
    .await;
    assert!(awaiting.as_array().unwrap().is_empty());

    let (_, corrected) = send(
        &app,
        "GET",
        "/api/records?filter=corrected",
        Some(&s.admin_token),
        None,
    )
    .await;
    assert_eq!(corrected.as_array().unwrap().len(), 1);

    // Acknowledged by the resident: gone from the corrected list too
    send(
        &app,
        "GET",
        &format!("/api/records/{}", s.record_guid),
        Some(&s.resident_token),
        None,
    )
    .await;

    let (_, corrected) = send(
        &app,
        "GET",
        "/api/records?filter=corrected",
        Some(&s.admin_token),
        None,
    )
    .await;
    assert!(corrected.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn listing_caps_at_page_size_setting() {
    let (app, pool) = setup_app().await;
    let s = setup_scenario(&app, &pool).await;

    // Two more records for the same pairing, three in total
    for _ in 0..2 {
        db::records::create_record(
            &pool,
            &s.surgery_guid,
            &s.resident_guid,
            &s.teacher_guid,
            &s.area_guid,
            chrono::Utc::now(),
        )
        .await
        .unwrap();
    }

    surgilog_common::db::settings::set_setting(&pool, "page_size", "2")
        .await
        .unwrap();

    let (status, list) = send(&app, "GET", "/api/records", Some(&s.admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 2);

    let (_, per_resident) = send(
        &app,
        "GET",
        &format!("/api/residents/{}/records", s.resident_guid),
        Some(&s.admin_token),
        None,
    )
    .await;
    assert_eq!(per_resident.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn unknown_filter_rejected() {
    let (app, pool) = setup_app().await;
    let s = setup_scenario(&app, &pool).await;

    let (status, _) = send(
        &app,
        "GET",
        "/api/records?filter=bogus",
        Some(&s.admin_token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn records_listed_per_resident() {
    let (app, pool) = setup_app().await;
    let s = setup_scenario(&app, &pool).await;

    let (status, list) = send(
        &app,
        "GET",
        &format!("/api/residents/{}/records", s.resident_guid),
        Some(&s.admin_token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["guid"], s.record_guid.as_str());
}

#[tokio::test]
async fn soft_deleted_record_hidden_everywhere() {
    let (app, pool) = setup_app().await;
    let s = setup_scenario(&app, &pool).await;

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/records/{}", s.record_guid),
        Some(&s.admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/records/{}", s.record_guid),
        Some(&s.admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = send(&app, "GET", "/api/records", Some(&s.admin_token), None).await;
    assert!(list.as_array().unwrap().is_empty());
}
