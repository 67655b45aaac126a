mod common;

use axum::http::{Method, StatusCode};
use common::{call, signup, test_app};
use serde_json::json;

#[tokio::test]
async fn ping_is_public() {
    let app = test_app();
    let (status, body) = call(&app, Method::GET, "/api/ping", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert!(body["time"].as_str().unwrap().contains('T'));
}

#[tokio::test]
async fn end_to_end_schedule_lifecycle() {
    let app = test_app();

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "name": "Alice", "email": "a@x.com", "password": "pw123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "a@x.com", "password": "pw123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "a@x.com");
    assert_eq!(body["user"]["name"], "Alice");
    assert!(body["user"].get("passwordHash").is_none());
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/schedules",
        Some(&token),
        Some(json!({ "name": "Aspirin", "time": "08:00" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = body["schedule"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["schedule"]["duration"], "N/A");
    assert_eq!(body["schedule"]["frequency"], "daily");

    let (status, list) = call(&app, Method::GET, "/api/schedules", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["id"], id.as_str());
    assert_eq!(list[0]["time"], "08:00");

    let (status, body) = call(
        &app,
        Method::DELETE,
        &format!("/api/schedules/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (_, list) = call(&app, Method::GET, "/api/schedules", Some(&token), None).await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let app = test_app();
    let body = json!({ "name": "Alice", "email": "a@x.com", "password": "pw123" });
    let (first, _) = call(&app, Method::POST, "/api/auth/register", None, Some(body.clone())).await;
    let (second, err) = call(&app, Method::POST, "/api/auth/register", None, Some(body)).await;
    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"], "User already exists");
}

#[tokio::test]
async fn register_requires_all_fields() {
    let app = test_app();
    for body in [
        json!({ "email": "a@x.com", "password": "pw" }),
        json!({ "name": "A", "password": "pw" }),
        json!({ "name": "A", "email": "a@x.com" }),
        json!({}),
    ] {
        let (status, err) = call(&app, Method::POST, "/api/auth/register", None, Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(err["error"].is_string());
    }
}

#[tokio::test]
async fn malformed_json_is_a_validation_error() {
    let app = test_app();
    let (status, err) = call(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!("just a string")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(err["error"].is_string());
}

#[tokio::test]
async fn bad_password_and_unknown_email_are_401() {
    let app = test_app();
    signup(&app, "Alice", "a@x.com", "pw123").await;

    let (wrong_pw, a) = call(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "a@x.com", "password": "nope" })),
    )
    .await;
    let (unknown, b) = call(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "ghost@x.com", "password": "pw123" })),
    )
    .await;
    assert_eq!(wrong_pw, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown, StatusCode::UNAUTHORIZED);
    assert_ne!(a["error"], b["error"]);
}

#[tokio::test]
async fn protected_routes_need_a_valid_token() {
    let app = test_app();
    let (status, err) = call(&app, Method::GET, "/api/schedules", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(err["error"], "Unauthorized");

    let (status, _) = call(&app, Method::GET, "/api/logs/history", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = signup(&app, "Alice", "a@x.com", "pw123").await;
    let (signed, _) = token.rsplit_once('.').unwrap();
    let tampered = format!("{signed}.c2lnbmF0dXJl");
    let (status, _) = call(&app, Method::GET, "/api/schedules", Some(&tampered), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn schedules_are_private_to_their_owner() {
    let app = test_app();
    let alice = signup(&app, "Alice", "a@x.com", "pw123").await;
    let bob = signup(&app, "Bob", "b@x.com", "pw456").await;

    let (_, body) = call(
        &app,
        Method::POST,
        "/api/schedules",
        Some(&alice),
        Some(json!({ "name": "Aspirin", "dosage": "500mg", "time": "08:00", "frequency": "daily" })),
    )
    .await;
    let id = body["schedule"]["id"].as_str().unwrap().to_string();
    call(
        &app,
        Method::POST,
        "/api/schedules",
        Some(&bob),
        Some(json!({ "name": "Insulin", "time": "07:00" })),
    )
    .await;

    let (_, bobs) = call(&app, Method::GET, "/api/schedules", Some(&bob), None).await;
    assert_eq!(bobs.as_array().unwrap().len(), 1);
    assert_eq!(bobs[0]["name"], "Insulin");

    // Bob deleting Alice's schedule "succeeds" but changes nothing.
    let (status, _) = call(&app, Method::DELETE, &format!("/api/schedules/{id}"), Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, alices) = call(&app, Method::GET, "/api/schedules", Some(&alice), None).await;
    assert_eq!(alices.as_array().unwrap().len(), 1);
    assert_eq!(alices[0]["dosage"], "500mg");

    // Bob cannot log against it either.
    let (status, err) = call(
        &app,
        Method::POST,
        "/api/logs",
        Some(&bob),
        Some(json!({ "scheduleId": id, "status": "taken" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["error"], "Schedule not found");
}

#[tokio::test]
async fn delete_unknown_id_is_success() {
    let app = test_app();
    let token = signup(&app, "Alice", "a@x.com", "pw123").await;
    call(
        &app,
        Method::POST,
        "/api/schedules",
        Some(&token),
        Some(json!({ "name": "Aspirin", "time": "08:00" })),
    )
    .await;

    for id in [uuid::Uuid::new_v4().to_string(), "not-an-id".to_string()] {
        let (status, body) = call(&app, Method::DELETE, &format!("/api/schedules/{id}"), Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
    }
    let (_, list) = call(&app, Method::GET, "/api/schedules", Some(&token), None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn delete_all_only_touches_caller() {
    let app = test_app();
    let alice = signup(&app, "Alice", "a@x.com", "pw123").await;
    let bob = signup(&app, "Bob", "b@x.com", "pw456").await;
    for (token, name) in [(&alice, "Aspirin"), (&alice, "Zinc"), (&bob, "Insulin")] {
        call(
            &app,
            Method::POST,
            "/api/schedules",
            Some(token),
            Some(json!({ "name": name, "time": "09:15" })),
        )
        .await;
    }

    let (status, body) = call(&app, Method::DELETE, "/api/schedules/deleteAll", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (_, alices) = call(&app, Method::GET, "/api/schedules", Some(&alice), None).await;
    let (_, bobs) = call(&app, Method::GET, "/api/schedules", Some(&bob), None).await;
    assert!(alices.as_array().unwrap().is_empty());
    assert_eq!(bobs.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn schedule_validation() {
    let app = test_app();
    let token = signup(&app, "Alice", "a@x.com", "pw123").await;
    for body in [
        json!({ "time": "08:00" }),
        json!({ "name": "Aspirin" }),
        json!({ "name": "Aspirin", "time": "8 o'clock" }),
        json!({ "name": "Aspirin", "time": "08:00", "frequency": "fortnightly" }),
    ] {
        let (status, err) = call(&app, Method::POST, "/api/schedules", Some(&token), Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(err["error"].is_string());
    }
}

#[tokio::test]
async fn logs_history_is_capped_at_ten_newest_first() {
    let app = test_app();
    let token = signup(&app, "Alice", "a@x.com", "pw123").await;
    let (_, body) = call(
        &app,
        Method::POST,
        "/api/schedules",
        Some(&token),
        Some(json!({ "name": "Aspirin", "time": "08:00" })),
    )
    .await;
    let id = body["schedule"]["id"].as_str().unwrap().to_string();

    for _ in 0..12 {
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/logs",
            Some(&token),
            Some(json!({ "scheduleId": id, "status": "taken" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["log"]["scheduleRef"], "Aspirin");
    }

    let (status, history) = call(&app, Method::GET, "/api/logs/history", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let entries = history.as_array().unwrap();
    assert_eq!(entries.len(), 10);
    let stamps: Vec<time::OffsetDateTime> = entries
        .iter()
        .map(|e| {
            time::OffsetDateTime::parse(
                e["timestamp"].as_str().unwrap(),
                &time::format_description::well_known::Rfc3339,
            )
            .unwrap()
        })
        .collect();
    assert!(stamps.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn log_validation_and_missing_schedule() {
    let app = test_app();
    let token = signup(&app, "Alice", "a@x.com", "pw123").await;

    let (status, _) = call(&app, Method::POST, "/api/logs", Some(&token), Some(json!({ "status": "taken" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/logs",
        Some(&token),
        Some(json!({ "scheduleId": uuid::Uuid::new_v4(), "status": "taken" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = call(
        &app,
        Method::POST,
        "/api/schedules",
        Some(&token),
        Some(json!({ "name": "Aspirin", "time": "08:00" })),
    )
    .await;
    let id = body["schedule"]["id"].as_str().unwrap().to_string();
    let (status, _) = call(
        &app,
        Method::POST,
        "/api/logs",
        Some(&token),
        Some(json!({ "scheduleId": id, "status": "perhaps" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn logs_outlive_deleted_schedules() {
    let app = test_app();
    let token = signup(&app, "Alice", "a@x.com", "pw123").await;
    let (_, body) = call(
        &app,
        Method::POST,
        "/api/schedules",
        Some(&token),
        Some(json!({ "name": "Aspirin", "time": "08:00" })),
    )
    .await;
    let id = body["schedule"]["id"].as_str().unwrap().to_string();
    call(
        &app,
        Method::POST,
        "/api/logs",
        Some(&token),
        Some(json!({ "scheduleId": id, "status": "missed" })),
    )
    .await;
    call(&app, Method::DELETE, "/api/schedules/deleteAll", Some(&token), None).await;

    let (_, history) = call(&app, Method::GET, "/api/logs/history", Some(&token), None).await;
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["scheduleRef"], "Aspirin");
    assert_eq!(history[0]["status"], "missed");
    assert_eq!(history[0]["scheduleId"], id.as_str());
}

#[tokio::test]
async fn non_bearer_scheme_is_an_invalid_token() {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request},
    };
    use tower::ServiceExt;

    let app = test_app();
    for value in ["Basic YTpi", "Token abc", "Bearer"] {
        let req = Request::builder()
            .uri("/api/schedules")
            .header(header::AUTHORIZATION, value)
            .body(Body::empty())
            .unwrap();
        let res = app.clone().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Invalid token", "header {value:?}");
    }
}
