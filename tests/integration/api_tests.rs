//! API integration tests: the full router over the in-memory store

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use erms_server::{
    api,
    models::{user::User, Device, Role},
    repository::Repository,
};

use common::{app_state, bearer, seed_device, seed_part, seed_user};

struct TestApp {
    router: Router,
    admin: User,
    requester: User,
    technician: User,
    device: Device,
}

async fn test_app() -> TestApp {
    let repository = Repository::in_memory();
    let admin = seed_user(&repository, Role::Admin, "alice").await;
    let requester = seed_user(&repository, Role::User, "ursula").await;
    let technician = seed_user(&repository, Role::Technician, "tom").await;
    let device = seed_device(&repository, &requester).await;
    let router = api::router(app_state(repository).await);
    TestApp {
        router,
        admin,
        requester,
        technician,
        device,
    }
}

async fn send(router: &Router, method: Method, uri: &str, caller: Option<&User>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = caller {
        builder = builder.header(header::AUTHORIZATION, bearer(user));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn file_request(app: &TestApp, issue: &str) -> i64 {
    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/v1/repairs",
        Some(&app.requester),
        Some(json!({ "device_id": app.device.id, "issue": issue })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = test_app().await;

    let (status, body) = send(&app.router, Method::GET, "/api/v1/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app.router, Method::GET, "/api/v1/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = test_app().await;

    let (status, body) = send(&app.router, Method::GET, "/api/v1/repairs", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "NotAuthorized");
}

#[tokio::test]
async fn test_invalid_token_is_unauthorized() {
    let app = test_app().await;
    let request = Request::builder()
        .uri("/api/v1/repairs")
        .header(header::AUTHORIZATION, "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_repair_request() {
    let app = test_app().await;

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/v1/repairs",
        Some(&app.requester),
        Some(json!({ "device_id": app.device.id, "issue": "Screen flicker" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "Pending");
    assert_eq!(body["requested_by_id"], app.requester.id);
    assert_eq!(body["issue"], "Screen flicker");
}

#[tokio::test]
async fn test_blank_issue_is_rejected() {
    let app = test_app().await;

    let (status, _) = send(
        &app.router,
        Method::POST,
        "/api/v1/repairs",
        Some(&app.requester),
        Some(json!({ "device_id": app.device.id, "issue": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_out_of_scope_detail_is_forbidden() {
    let app = test_app().await;
    let id = file_request(&app, "Broken hinge").await;

    let (status, _) = send(&app.router, Method::GET, &format!("/api/v1/repairs/{}", id), Some(&app.technician), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app.router, Method::GET, &format!("/api/v1/repairs/{}", id), Some(&app.requester), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id);
}

#[tokio::test]
async fn test_second_cancel_conflicts() {
    let app = test_app().await;
    let id = file_request(&app, "Battery swollen").await;
    let uri = format!("/api/v1/repairs/{}", id);

    let (status, body) = send(&app.router, Method::PUT, &uri, Some(&app.requester), Some(json!({ "status": "Cancelled" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Cancelled");

    let (status, _) = send(&app.router, Method::PUT, &uri, Some(&app.requester), Some(json!({ "status": "Cancelled" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_requester_cannot_reprioritize() {
    let app = test_app().await;
    let id = file_request(&app, "Sticky keys").await;

    let (status, _) = send(
        &app.router,
        Method::PUT,
        &format!("/api/v1/repairs/{}", id),
        Some(&app.requester),
        Some(json!({ "priority": "Urgent" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_assign_accept_and_comment() {
    let app = test_app().await;
    let id = file_request(&app, "No Wi-Fi").await;

    let (status, body) = send(
        &app.router,
        Method::PUT,
        &format!("/api/v1/repairs/{}", id),
        Some(&app.admin),
        Some(json!({ "assigned_to_id": app.technician.id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["assigned_to_id"], app.technician.id);

    let (status, body) = send(&app.router, Method::POST, &format!("/api/v1/repairs/{}/accept", id), Some(&app.technician), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "In Progress");
    assert_eq!(body["accepted"], true);

    let (status, body) = send(
        &app.router,
        Method::POST,
        &format!("/api/v1/repairs/{}/comments", id),
        Some(&app.technician),
        Some(json!({ "text": "Antenna cable loose" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["comments"][0]["text"], "Antenna cable loose");

    let (status, _) = send(
        &app.router,
        Method::POST,
        &format!("/api/v1/repairs/{}/comments", id),
        Some(&app.technician),
        Some(json!({ "text": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_inventory_is_closed_to_plain_users() {
    let app = test_app().await;

    let (status, _) = send(&app.router, Method::GET, "/api/v1/inventory", Some(&app.requester), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app.router, Method::GET, "/api/v1/inventory", Some(&app.technician), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_consume_beyond_stock_conflicts() {
    let repository = Repository::in_memory();
    let technician = seed_user(&repository, Role::Technician, "tom").await;
    let part = seed_part(&repository, "Hinge", 2, 5).await;
    let router = api::router(app_state(repository).await);

    let (status, body) = send(
        &router,
        Method::POST,
        &format!("/api/v1/inventory/{}/consume", part.id),
        Some(&technician),
        Some(json!({ "quantity": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 9);

    let (status, body) = send(&router, Method::GET, &format!("/api/v1/inventory/{}", part.id), Some(&technician), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["quantity"], 2);
}

#[tokio::test]
async fn test_notifications_read_all() {
    let app = test_app().await;
    file_request(&app, "Printer jam").await;
    file_request(&app, "Toner smear").await;

    let (status, body) = send(&app.router, Method::GET, "/api/v1/notifications", Some(&app.admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let inbox = body.as_array().unwrap();
    assert_eq!(inbox.len(), 2);
    assert!(inbox.iter().all(|n| n["read"] == false));

    let first = inbox[0]["id"].as_i64().unwrap();
    let (status, body) = send(&app.router, Method::PUT, &format!("/api/v1/notifications/{}/read", first), Some(&app.admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["read"], true);

    let (status, body) = send(&app.router, Method::PUT, "/api/v1/notifications/read-all", Some(&app.admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated"], 1);

    let (_, body) = send(&app.router, Method::PUT, "/api/v1/notifications/read-all", Some(&app.admin), None).await;
    assert_eq!(body["updated"], 0);

    // Requesters never see the admin broadcast
    let (_, body) = send(&app.router, Method::GET, "/api/v1/notifications", Some(&app.requester), None).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_dashboard_is_admin_only() {
    let app = test_app().await;
    file_request(&app, "Overheating").await;

    let (status, _) = send(&app.router, Method::GET, "/api/v1/dashboard", Some(&app.technician), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app.router, Method::GET, "/api/v1/dashboard", Some(&app.admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["counts"]["repairs"], 1);
    assert_eq!(body["counts"]["pending"], 1);
    assert_eq!(body["recent_activity"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_me_returns_the_caller() {
    let app = test_app().await;

    let (status, body) = send(&app.router, Method::GET, "/api/v1/users/me", Some(&app.technician), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "tom");
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = test_app().await;

    let (status, body) = send(&app.router, Method::GET, "/api-docs/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/repairs/{id}"].is_object());
}
