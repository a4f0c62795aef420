//! Sign-in, registration, Google sign-in, sign-out and password reset.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use serde_json::{Value, json};

use satchel_integration_tests::{FakeIdentity, TEST_PASSWORD, TestApp, VALID_GOOGLE_TOKEN};

fn login_body(email: &str, password: &str) -> Value {
    json!({ "email": email, "password": password })
}

fn app_with_ada(verified: bool) -> TestApp {
    TestApp::builder()
        .identity(FakeIdentity::new().with_account("ada@example.com", "Ada Lovelace", verified))
        .build()
}

#[tokio::test]
async fn test_login_starts_session() {
    let mut app = app_with_ada(true);

    let response = app
        .post("/api/auth/login", &login_body("ada@example.com", TEST_PASSWORD))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["notice"]["title"], "Login Successful");
    assert_eq!(
        response.body["notice"]["description"],
        "Welcome back, Ada Lovelace!"
    );
    assert_eq!(response.body["redirect"], "/");

    let me = app.get("/api/auth/me").await;
    assert_eq!(me.body["user"]["email"], "ada@example.com");
    assert_eq!(me.body["user"]["name"], "Ada Lovelace");
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized() {
    let mut app = app_with_ada(true);

    let response = app
        .post("/api/auth/login", &login_body("ada@example.com", "not-the-password"))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "Invalid email or password");
    assert_eq!(app.get("/api/auth/me").await.body["user"], Value::Null);
}

#[tokio::test]
async fn test_malformed_email_is_bad_request() {
    let mut app = TestApp::new();
    let response = app
        .post("/api/auth/login", &login_body("not-an-email", TEST_PASSWORD))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_signs_in_immediately() {
    let mut app = TestApp::new();

    let response = app
        .post(
            "/api/auth/register",
            &json!({ "name": "Alan Turing", "email": "alan@example.com", "password": "enigma-1912" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["user"]["name"], "Alan Turing");
    assert_eq!(app.get("/api/auth/me").await.body["user"]["email"], "alan@example.com");
}

#[tokio::test]
async fn test_register_rejects_duplicate_and_weak_password() {
    let mut app = app_with_ada(true);

    let duplicate = app
        .post(
            "/api/auth/register",
            &json!({ "name": "Ada", "email": "ada@example.com", "password": "enigma-1912" }),
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    let weak = app
        .post(
            "/api/auth/register",
            &json!({ "name": "Bo", "email": "bo@example.com", "password": "abc" }),
        )
        .await;
    assert_eq!(weak.status, StatusCode::BAD_REQUEST);
    assert_eq!(weak.body["error"], "Password should be at least 6 characters");
}

#[tokio::test]
async fn test_verification_gating() {
    let mut app = TestApp::builder()
        .identity(FakeIdentity::new().with_account("ada@example.com", "Ada", false))
        .require_email_verification()
        .build();

    let registered = app
        .post(
            "/api/auth/register",
            &json!({ "name": "Alan", "email": "alan@example.com", "password": "enigma-1912" }),
        )
        .await;
    assert_eq!(registered.status, StatusCode::ACCEPTED);
    assert_eq!(registered.body["notice"]["title"], "Verify your email");
    assert_eq!(registered.body["redirect"], "/login");
    assert_eq!(app.identity.verification_emails(), 1);
    assert_eq!(app.get("/api/auth/me").await.body["user"], Value::Null);

    let login = app
        .post("/api/auth/login", &login_body("ada@example.com", TEST_PASSWORD))
        .await;
    assert_eq!(login.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_google_sign_in() {
    let mut app = TestApp::new();

    let response = app
        .post("/api/auth/google", &json!({ "idToken": VALID_GOOGLE_TOKEN }))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["notice"]["description"], "Welcome back, Grace Hopper!");
    assert_eq!(app.get("/api/auth/me").await.body["user"]["email"], "grace@example.com");
}

#[tokio::test]
async fn test_google_failure_shows_notice() {
    let mut app = TestApp::new();

    let response = app
        .post("/api/auth/google", &json!({ "idToken": "forged" }))
        .await;

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert_eq!(response.body["notice"]["title"], "Login Failed");
    assert_eq!(response.body["notice"]["kind"], "destructive");
    assert_eq!(app.get("/api/auth/me").await.body["user"], Value::Null);
}

#[tokio::test]
async fn test_logout_keeps_cart() {
    let mut app = app_with_ada(true);
    app.post("/api/auth/login", &login_body("ada@example.com", TEST_PASSWORD))
        .await;
    app.post("/api/cart/add", &json!({ "productId": "3" })).await;

    let response = app.post("/api/auth/logout", &json!({})).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["notice"]["title"], "Logged Out");
    assert_eq!(response.body["redirect"], "/login");
    assert_eq!(app.get("/api/auth/me").await.body["user"], Value::Null);
    assert_eq!(app.get("/api/cart/count").await.body["count"], 1);
}

#[tokio::test]
async fn test_forgot_password_does_not_reveal_accounts() {
    let mut app = app_with_ada(true);

    let known = app
        .post("/api/auth/forgot-password", &json!({ "email": "ada@example.com" }))
        .await;
    let unknown = app
        .post("/api/auth/forgot-password", &json!({ "email": "nobody@example.com" }))
        .await;

    assert_eq!(known.status, StatusCode::OK);
    assert_eq!(unknown.status, StatusCode::OK);
    assert_eq!(known.body, unknown.body);
    assert_eq!(unknown.body["notice"]["title"], "Check your email!");
    assert_eq!(
        app.identity.reset_requests(),
        ["ada@example.com", "nobody@example.com"]
    );

    let malformed = app
        .post("/api/auth/forgot-password", &json!({ "email": "nobody" }))
        .await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
}
