//! Area membership tests
//!
//! Ordered lists, idempotent adds, the remove-teacher-everywhere pull, and
//! the two-step resident move.

mod helpers;

use axum::http::StatusCode;
use helpers::{create_login, send, setup_app};
use serde_json::json;

use surgilog_common::models::Role;
use surgilog_web::db;

#[tokio::test]
async fn adding_resident_twice_keeps_one_entry() {
    let (app, pool) = setup_app().await;
    let token = create_login(&app, &pool, "root", Role::Admin, None).await;

    let area = db::areas::create_area(&pool, "Trauma", "").await.unwrap();
    let resident = db::residents::create_resident(&pool, "Alice Vega", "", 1)
        .await
        .unwrap();

    for _ in 0..2 {
        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/areas/{}/residents", area.guid),
            Some(&token),
            Some(json!({ "resident_guid": resident.guid })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let members = db::areas::area_residents(&pool, &area.guid).await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].guid, resident.guid);
}

#[tokio::test]
async fn membership_preserves_insertion_order() {
    let (_app, pool) = setup_app().await;

    let area = db::areas::create_area(&pool, "Trauma", "").await.unwrap();
    let mut guids = Vec::new();
    for name in ["First", "Second", "Third"] {
        let r = db::residents::create_resident(&pool, name, "", 1)
            .await
            .unwrap();
        db::areas::add_resident_to_area(&pool, &area.guid, &r.guid)
            .await
            .unwrap();
        guids.push(r.guid);
    }

    let members = db::areas::area_residents(&pool, &area.guid).await.unwrap();
    let got: Vec<&str> = members.iter().map(|r| r.guid.as_str()).collect();
    assert_eq!(got, guids.iter().map(|g| g.as_str()).collect::<Vec<_>>());
}

#[tokio::test]
async fn adding_unknown_resident_is_not_found() {
    let (app, pool) = setup_app().await;
    let token = create_login(&app, &pool, "root", Role::Admin, None).await;

    let area = db::areas::create_area(&pool, "Trauma", "").await.unwrap();

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/areas/{}/residents", area.guid),
        Some(&token),
        Some(json!({ "resident_guid": "no-such-resident" })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_teacher_pulls_them_from_every_area() {
    let (app, pool) = setup_app().await;
    let token = create_login(&app, &pool, "root", Role::Admin, None).await;

    let teacher = db::teachers::create_teacher(&pool, "Dr. Braun", "")
        .await
        .unwrap();
    let other = db::teachers::create_teacher(&pool, "Dr. Osei", "")
        .await
        .unwrap();

    let mut area_guids = Vec::new();
    for name in ["Trauma", "Cardiology", "Urology"] {
        let area = db::areas::create_area(&pool, name, "").await.unwrap();
        db::areas::add_teacher_to_area(&pool, &area.guid, &teacher.guid)
            .await
            .unwrap();
        db::areas::add_teacher_to_area(&pool, &area.guid, &other.guid)
            .await
            .unwrap();
        area_guids.push(area.guid);
    }

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/teachers/{}", teacher.guid),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Pulled from every list; the other teacher is untouched
    for area_guid in &area_guids {
        let members = db::areas::area_teachers(&pool, area_guid).await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].guid, other.guid);
    }

    // And the teacher itself is soft-deleted
    assert!(db::teachers::get_teacher(&pool, &teacher.guid)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn move_resident_appends_to_destination_and_removes_from_origin() {
    let (app, pool) = setup_app().await;
    let token = create_login(&app, &pool, "root", Role::Admin, None).await;

    let origin = db::areas::create_area(&pool, "Trauma", "").await.unwrap();
    let destination = db::areas::create_area(&pool, "Cardiology", "")
        .await
        .unwrap();

    let incumbent = db::residents::create_resident(&pool, "Bob Lane", "", 1)
        .await
        .unwrap();
    let mover = db::residents::create_resident(&pool, "Alice Vega", "", 2)
        .await
        .unwrap();

    db::areas::add_resident_to_area(&pool, &destination.guid, &incumbent.guid)
        .await
        .unwrap();
    db::areas::add_resident_to_area(&pool, &origin.guid, &mover.guid)
        .await
        .unwrap();

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/residents/{}/move", mover.guid),
        Some(&token),
        Some(json!({
            "from_area_guid": origin.guid,
            "to_area_guid": destination.guid
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let origin_members = db::areas::area_residents(&pool, &origin.guid).await.unwrap();
    assert!(origin_members.is_empty());

    // Appended at the tail, after the incumbent
    let destination_members = db::areas::area_residents(&pool, &destination.guid)
        .await
        .unwrap();
    let got: Vec<&str> = destination_members.iter().map(|r| r.guid.as_str()).collect();
    assert_eq!(got, vec![incumbent.guid.as_str(), mover.guid.as_str()]);
}

#[tokio::test]
async fn soft_deleted_resident_vanishes_from_area_detail() {
    let (app, pool) = setup_app().await;
    let token = create_login(&app, &pool, "root", Role::Admin, None).await;

    let area = db::areas::create_area(&pool, "Trauma", "").await.unwrap();
    let resident = db::residents::create_resident(&pool, "Alice Vega", "", 1)
        .await
        .unwrap();
    db::areas::add_resident_to_area(&pool, &area.guid, &resident.guid)
        .await
        .unwrap();

    db::residents::soft_delete_resident(&pool, &resident.guid)
        .await
        .unwrap();

    let (status, detail) = send(
        &app,
        "GET",
        &format!("/api/areas/{}", area.guid),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(detail["residents"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn area_detail_lists_both_member_kinds_in_order() {
    let (app, pool) = setup_app().await;
    let token = create_login(&app, &pool, "root", Role::Admin, None).await;

    let area = db::areas::create_area(&pool, "Trauma", "").await.unwrap();
    let resident = db::residents::create_resident(&pool, "Alice Vega", "", 1)
        .await
        .unwrap();
    let teacher = db::teachers::create_teacher(&pool, "Dr. Braun", "")
        .await
        .unwrap();

    db::areas::add_resident_to_area(&pool, &area.guid, &resident.guid)
        .await
        .unwrap();
    db::areas::add_teacher_to_area(&pool, &area.guid, &teacher.guid)
        .await
        .unwrap();

    let (_, detail) = send(
        &app,
        "GET",
        &format!("/api/areas/{}", area.guid),
        Some(&token),
        None,
    )
    .await;

    assert_eq!(detail["residents"][0]["name"], "Alice Vega");
    assert_eq!(detail["teachers"][0]["name"], "Dr. Braun");
}
