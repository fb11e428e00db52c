//! HTTP-level integration tests for the `/documents` and `/dashboard` APIs.
//!
//! Uses Axum's tower::ServiceExt to send requests directly to the router,
//! which is wired to the in-memory approval engine.

mod common;

use axum::http::StatusCode;
use axum::Router;
use common::{
    body_json, build_test_app, delete, get, post_empty, post_json, token, ADMIN, DIREKSI,
    OTHER_VENDOR, PIC_GUDANG, PIC_PEMESAN, VENDOR,
};
use serde_json::json;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn bapb_payload() -> serde_json::Value {
    json!({
        "order_number": "PO-2026-0042",
        "delivery_date": "2026-10-01",
        "items": [{ "name": "Semen 50kg", "quantity": 120, "unit": "sak" }]
    })
}

fn bapp_payload() -> serde_json::Value {
    json!({
        "contract_number": "SPK-2026-17",
        "project_name": "Renovasi Gudang B",
        "work_details": [{ "description": "Pengecatan", "progress_pct": 100 }]
    })
}

/// Submit as `VENDOR` and return the new document id.
async fn submit(app: &Router, kind: &str) -> i64 {
    let payload = if kind == "bapb" { bapb_payload() } else { bapp_payload() };
    let response = post_json(
        app.clone(),
        &format!("/api/v1/documents/{kind}"),
        Some(&token(VENDOR, "vendor")),
        json!({ "payload": payload }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_token_is_401() {
    let app = build_test_app();
    let response = get(app.router, "/api/v1/documents/bapb", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn garbage_token_is_401() {
    let app = build_test_app();
    let response = get(app.router, "/api/v1/documents/bapb", Some("not-a-jwt")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_kind_is_400() {
    let app = build_test_app();
    let response = get(
        app.router,
        "/api/v1/documents/invoice",
        Some(&token(ADMIN, "admin")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bapb_full_lifecycle_over_http() {
    let app = build_test_app().router;
    let id = submit(&app, "bapb").await;

    let response = post_json(
        app.clone(),
        &format!("/api/v1/documents/bapb/{id}/approve"),
        Some(&token(PIC_GUDANG, "pic_gudang")),
        json!({ "signature_url": "/uploads/signatures/budi.png" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["current_stage"], "waiting_direksi");
    assert_eq!(json["data"]["status"], "pending");
    assert_eq!(
        json["data"]["approval_history"][1]["signature_url"],
        "/uploads/signatures/budi.png"
    );

    let response = post_json(
        app.clone(),
        &format!("/api/v1/documents/bapb/{id}/approve"),
        Some(&token(DIREKSI, "direksi")),
        json!({ "notes": "Sesuai PO" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["current_stage"], "approved");
    assert_eq!(json["data"]["status"], "approved");
    assert_eq!(json["data"]["approval_history"].as_array().unwrap().len(), 3);

    let response = post_json(
        app.clone(),
        &format!("/api/v1/documents/bapb/{id}/reject"),
        Some(&token(DIREKSI, "direksi")),
        json!({ "notes": "too late" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "ALREADY_TERMINAL");
}

#[tokio::test]
async fn bapp_rejection_requires_notes() {
    let app = build_test_app().router;
    let id = submit(&app, "bapp").await;
    let uri = format!("/api/v1/documents/bapp/{id}/reject");

    let pic = token(PIC_PEMESAN, "pic_pemesan");
    let response = post_json(app.clone(), &uri, Some(&pic), json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let response = post_json(
        app.clone(),
        &uri,
        Some(&token(PIC_PEMESAN, "pic_pemesan")),
        json!({ "notes": "incomplete scope" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["current_stage"], "rejected");
    assert_eq!(json["data"]["approval_history"][1]["stage"], "pic_review");
    assert_eq!(json["data"]["approval_history"][1]["notes"], "incomplete scope");
}

#[tokio::test]
async fn wrong_reviewer_is_403_even_with_forged_role_claim() {
    let app = build_test_app().router;
    let id = submit(&app, "bapb").await;

    // The token claims admin, but the role table says direksi.
    let response = post_json(
        app.clone(),
        &format!("/api/v1/documents/bapb/{id}/approve"),
        Some(&token(DIREKSI, "admin")),
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "FORBIDDEN");

    let response = get(
        app,
        &format!("/api/v1/documents/bapb/{id}"),
        Some(&token(ADMIN, "admin")),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["current_stage"], "waiting_pic");
    assert_eq!(json["data"]["approval_history"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_user_with_valid_token_is_403() {
    let app = build_test_app().router;
    let response = get(app, "/api/v1/documents/bapb", Some(&token(4242, "admin"))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn invalid_payload_is_400() {
    let app = build_test_app().router;
    let response = post_json(
        app,
        "/api/v1/documents/bapb",
        Some(&token(VENDOR, "vendor")),
        json!({
            "payload": { "order_number": "PO-1", "delivery_date": "2026-10-01", "items": [] }
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn get_missing_document_is_404() {
    let app = build_test_app().router;
    let response = get(app, "/api/v1/documents/bapp/999", Some(&token(ADMIN, "admin"))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

// ---------------------------------------------------------------------------
// Visibility
// ---------------------------------------------------------------------------

#[tokio::test]
async fn vendor_listing_is_scoped_to_own_documents() {
    let app = build_test_app().router;
    let mine = submit(&app, "bapb").await;

    let response = get(
        app.clone(),
        "/api/v1/documents/bapb",
        Some(&token(OTHER_VENDOR, "vendor")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["data"].as_array().unwrap().is_empty());

    let response = get(
        app.clone(),
        &format!("/api/v1/documents/bapb/{mine}"),
        Some(&token(OTHER_VENDOR, "vendor")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(
        app,
        "/api/v1/documents/bapb?status=pending&limit=5",
        Some(&token(VENDOR, "vendor")),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["id"], mine);
}

#[tokio::test]
async fn vendor_actions_on_foreign_document_are_404() {
    let app = build_test_app().router;
    let theirs = submit(&app, "bapb").await;
    let other = token(OTHER_VENDOR, "vendor");

    for action in ["approve", "reject", "archive"] {
        let response = post_json(
            app.clone(),
            &format!("/api/v1/documents/bapb/{theirs}/{action}"),
            Some(&other),
            json!({ "notes": "bukan milik saya" }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{action}");
    }
}

#[tokio::test]
async fn admin_submission_for_non_vendor_is_400() {
    let app = build_test_app().router;
    let response = post_json(
        app,
        "/api/v1/documents/bapb",
        Some(&token(ADMIN, "admin")),
        json!({ "vendor_id": PIC_GUDANG, "payload": bapb_payload() }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Archive / restore / delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn archive_restore_and_delete_over_http() {
    let app = build_test_app().router;
    let id = submit(&app, "bapp").await;
    let admin = token(ADMIN, "admin");

    // Live documents cannot be deleted.
    let response = delete(app.clone(), &format!("/api/v1/documents/bapp/{id}"), Some(&admin)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_empty(
        app.clone(),
        &format!("/api/v1/documents/bapp/{id}/archive"),
        Some(&token(VENDOR, "vendor")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["is_archived"], true);

    // Hidden from the default listing, visible in the bin.
    let response = get(app.clone(), "/api/v1/documents/bapp", Some(&admin)).await;
    assert!(body_json(response).await["data"].as_array().unwrap().is_empty());
    let response = get(app.clone(), "/api/v1/documents/bapp?archived=true", Some(&admin)).await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 1);

    // Vendor may not restore.
    let response = post_empty(
        app.clone(),
        &format!("/api/v1/documents/bapp/{id}/restore"),
        Some(&token(VENDOR, "vendor")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_empty(
        app.clone(),
        &format!("/api/v1/documents/bapp/{id}/restore"),
        Some(&admin),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["is_archived"], false);

    post_empty(app.clone(), &format!("/api/v1/documents/bapp/{id}/archive"), Some(&admin)).await;
    let response = delete(app.clone(), &format!("/api/v1/documents/bapp/{id}"), Some(&admin)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(app, &format!("/api/v1/documents/bapp/{id}"), Some(&admin)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[tokio::test]
async fn dashboard_stats_by_kind() {
    let app = build_test_app().router;
    let a = submit(&app, "bapb").await;
    submit(&app, "bapb").await;
    submit(&app, "bapp").await;

    post_json(
        app.clone(),
        &format!("/api/v1/documents/bapb/{a}/approve"),
        Some(&token(PIC_GUDANG, "pic_gudang")),
        json!({}),
    )
    .await;

    let response = get(
        app.clone(),
        "/api/v1/dashboard/stats?kind=bapb",
        Some(&token(DIREKSI, "direksi")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["total"], 2);
    assert_eq!(json["data"]["waiting_pic"], 1);
    assert_eq!(json["data"]["waiting_direksi"], 1);
    assert_eq!(json["data"]["pending"], 2);

    let response = get(app, "/api/v1/dashboard/stats", Some(&token(OTHER_VENDOR, "vendor"))).await;
    assert_eq!(body_json(response).await["data"]["total"], 0);
}
