//! End-to-end tests driving the full router (auth middleware included)
//! over the in-memory store.

use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use club_server::api::build_app;
use club_server::services::MemberSchema;
use club_server::{Config, ServerState, Stores};

const ADMIN_USER: &str = "admin";
const ADMIN_PASS: &str = "admin-pass";

async fn app() -> Router {
    let config = Config {
        login_delay_ms: 0,
        member_schema: MemberSchema::Basic,
        ..Config::default()
    };
    let state = ServerState::new(config, Stores::memory());
    state
        .users
        .ensure_bootstrap_admin(ADMIN_USER, ADMIN_PASS)
        .await
        .unwrap();
    build_app(&state).with_state(state)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn login(app: &Router, username: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["token"].as_str().unwrap().to_string()
}

async fn create_member(app: &Router, token: &str, body: Value) -> Value {
    let (status, member) = send(app, Method::POST, "/api/members", Some(token), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{member}");
    member
}

#[tokio::test]
async fn test_health_is_public() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_guest_gets_401() {
    let app = app().await;
    for uri in [
        "/api/members",
        "/api/members/me",
        "/api/users",
        "/api/subscriptions/plans",
        "/api/auth/me",
    ] {
        let (status, body) = send(&app, Method::GET, uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(body["code"], 1001);
    }

    let (status, _) = send(&app, Method::GET, "/api/members", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_uniform_failure_and_hidden_hash() {
    let app = app().await;

    let wrong = json!({ "username": ADMIN_USER, "password": "nope-nope" });
    let unknown = json!({ "username": "ghost", "password": ADMIN_PASS });
    let (s1, b1) = send(&app, Method::POST, "/api/auth/login", None, Some(wrong)).await;
    let (s2, b2) = send(&app, Method::POST, "/api/auth/login", None, Some(unknown)).await;
    assert_eq!(s1, StatusCode::UNAUTHORIZED);
    assert_eq!(s2, StatusCode::UNAUTHORIZED);
    assert_eq!(b1, b2);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "username": ADMIN_USER })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing required fields: password");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "username": ADMIN_USER, "password": ADMIN_PASS })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "ADMIN");
    assert!(body["user"].get("passwordHash").is_none());

    let token = body["token"].as_str().unwrap();
    let (status, me) = send(&app, Method::GET, "/api/auth/me", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], ADMIN_USER);
    assert!(me.get("passwordHash").is_none());
}

#[tokio::test]
async fn test_member_crud() {
    let app = app().await;
    let admin = login(&app, ADMIN_USER, ADMIN_PASS).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/members",
        Some(&admin),
        Some(json!({ "firstName": "Ama" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing required fields: lastName, email");

    let member = create_member(
        &app,
        &admin,
        json!({ "firstName": "Ama", "lastName": "Mensah", "email": "ama@example.com", "level": "silver" }),
    )
    .await;
    let id = member["id"].as_str().unwrap().to_string();
    assert_eq!(member["level"], "SILVER");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/members",
        Some(&admin),
        Some(json!({ "firstName": "Kofi", "lastName": "Owusu", "email": "AMA@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, list) = send(&app, Method::GET, "/api/members?q=mens", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, updated) = send(
        &app,
        Method::PATCH,
        &format!("/api/members/{id}"),
        Some(&admin),
        Some(json!({ "phone": "+233200000000", "status": "ACTIVE" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["phone"], "+233200000000");
    assert_eq!(updated["status"], "ACTIVE");
    assert_eq!(updated["firstName"], "Ama");

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/api/members/{id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 0);

    let (status, _) = send(&app, Method::GET, &format!("/api/members/{id}"), Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_member_role_gating_and_me() {
    let app = app().await;
    let admin = login(&app, ADMIN_USER, ADMIN_PASS).await;

    let member = create_member(
        &app,
        &admin,
        json!({ "firstName": "Ama", "lastName": "Mensah", "email": "ama@example.com" }),
    )
    .await;

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/users",
        Some(&admin),
        Some(json!({
            "username": "ama",
            "email": "ama@example.com",
            "role": "MEMBER",
            "memberId": member["id"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let temp = created["temporaryPassword"].as_str().unwrap().to_string();
    assert!(created.get("passwordHash").is_none());

    let member_token = login(&app, "ama", &temp).await;

    let (status, me) = send(&app, Method::GET, "/api/members/me", Some(&member_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], member["id"]);

    // admin without a linked member
    let (status, _) = send(&app, Method::GET, "/api/members/me", Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    for (method, uri) in [
        (Method::GET, "/api/members"),
        (Method::GET, "/api/users"),
        (Method::GET, "/api/subscriptions/plans"),
        (Method::GET, "/api/subscriptions/payments"),
    ] {
        let (status, body) = send(&app, method, uri, Some(&member_token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
        assert_eq!(body["code"], 2003);
    }

    let (status, me) = send(&app, Method::GET, "/api/users/me", Some(&member_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["role"], "MEMBER");
}

#[tokio::test]
async fn test_user_password_reset() {
    let app = app().await;
    let admin = login(&app, ADMIN_USER, ADMIN_PASS).await;

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/users",
        Some(&admin),
        Some(json!({ "username": "kofi", "email": "kofi@example.com", "role": "ADMIN", "password": "first-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(created.get("temporaryPassword").is_none());
    let id = created["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/users",
        Some(&admin),
        Some(json!({ "username": "kofi", "email": "other@example.com", "role": "ADMIN" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let uri = format!("/api/users/{id}/password");
    let (status, _) = send(&app, Method::PATCH, &uri, Some(&admin), Some(json!({ "password": "123" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::PATCH,
        &uri,
        Some(&admin),
        Some(json!({ "newPassword": "second-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    login(&app, "kofi", "second-pass").await;

    let (status, _) = send(
        &app,
        Method::PATCH,
        "/api/users/usr_missing/password",
        Some(&admin),
        Some(json!({ "password": "whatever-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_dues_flow() {
    let app = app().await;
    let admin = login(&app, ADMIN_USER, ADMIN_PASS).await;

    let silver = create_member(
        &app,
        &admin,
        json!({ "firstName": "Ama", "lastName": "Mensah", "email": "ama@example.com", "level": "SILVER" }),
    )
    .await;
    create_member(
        &app,
        &admin,
        json!({ "firstName": "Kofi", "lastName": "Owusu", "email": "kofi@example.com", "level": "GOLD" }),
    )
    .await;

    let (status, plan) = send(
        &app,
        Method::POST,
        "/api/subscriptions/plans",
        Some(&admin),
        Some(json!({ "name": "Monthly Dues", "code": "DUES", "amount": 50, "billingCycle": "MONTHLY" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(plan["currency"], "GHS");

    let (status, assessment) = send(
        &app,
        Method::POST,
        "/api/subscriptions/assessments",
        Some(&admin),
        Some(json!({
            "planId": plan["id"],
            "period": "2025-08",
            "targetType": "LEVEL",
            "targetLevel": "SILVER",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{assessment}");
    assert_eq!(assessment["materialized"], 1);
    assert_eq!(assessment["createdBy"], ADMIN_USER);

    let (status, subs) = send(
        &app,
        Method::GET,
        "/api/subscriptions/member-subscriptions?status=PENDING&level=SILVER",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let subs = subs.as_array().unwrap().clone();
    assert_eq!(subs.len(), 1);
    assert_eq!(subs[0]["memberId"], silver["id"]);
    assert_eq!(subs[0]["amount"], 50.0);

    let (status, payment) = send(
        &app,
        Method::POST,
        "/api/subscriptions/payments",
        Some(&admin),
        Some(json!({
            "memberId": silver["id"],
            "planId": plan["id"],
            "amount": 50,
            "paidAt": "2025-08-15",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{payment}");
    assert_eq!(payment["subscriptionId"], subs[0]["id"]);

    let (_, paid) = send(
        &app,
        Method::GET,
        "/api/subscriptions/member-subscriptions?status=PAID",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(paid.as_array().unwrap().len(), 1);
    assert_eq!(paid[0]["paymentId"], payment["id"]);

    let (status, listed) = send(
        &app,
        Method::GET,
        "/api/subscriptions/payments?from=2025-08-01&to=2025-08-31",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, result) = send(
        &app,
        Method::PATCH,
        "/api/subscriptions/member-subscriptions",
        Some(&admin),
        Some(json!({ "ids": [subs[0]["id"]], "status": "WAIVED" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["updated"], 1);

    let (status, body) = send(
        &app,
        Method::PATCH,
        "/api/subscriptions/member-subscriptions",
        Some(&admin),
        Some(json!({ "ids": [], "status": "PAID" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No ids provided");
}

#[tokio::test]
async fn test_payment_validation_errors() {
    let app = app().await;
    let admin = login(&app, ADMIN_USER, ADMIN_PASS).await;
    let member = create_member(
        &app,
        &admin,
        json!({ "firstName": "Ama", "lastName": "Mensah", "email": "ama@example.com" }),
    )
    .await;
    let (_, plan) = send(
        &app,
        Method::POST,
        "/api/subscriptions/plans",
        Some(&admin),
        Some(json!({ "name": "Annual", "amount": 300 })),
    )
    .await;

    let cases = [
        json!({ "memberId": "ghost", "planId": plan["id"], "amount": 10, "paidAt": "2025-08-15" }),
        json!({ "memberId": member["id"], "planId": plan["id"], "amount": 0, "paidAt": "2025-08-15" }),
        json!({ "memberId": member["id"], "planId": plan["id"], "amount": 10, "paidAt": "yesterday" }),
    ];
    for body in cases {
        let (status, err) = send(
            &app,
            Method::POST,
            "/api/subscriptions/payments",
            Some(&admin),
            Some(body),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{err}");
    }

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/subscriptions/payments",
        Some(&admin),
        Some(json!({ "memberId": member["id"], "planId": plan["id"], "amount": "ten" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}
