mod common;

use common::{TestApp, PASSWORD};
use serde_json::json;
use warp::http::StatusCode;

#[tokio::test]
async fn register_returns_token_and_customer_role() {
    let app = TestApp::new();
    let user = app.register("Budi Santoso", "Budi@Example.com").await;

    let (status, body) = app.get("/api/auth/me", &user.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["email"], "budi@example.com");
    assert_eq!(body["data"]["roles"][0]["slug"], "customer");
    let permissions = body["data"]["permissions"].as_array().unwrap();
    assert!(permissions.contains(&json!("tickets.create")));
    assert!(!permissions.contains(&json!("customers.view")));
    assert!(body["data"].get("password").is_none());
}

#[tokio::test]
async fn duplicate_email_is_a_field_error() {
    let app = TestApp::new();
    app.register("Budi", "budi@example.com").await;

    let (status, body) = app
        .call(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "name": "Budi Lain",
                "email": "BUDI@example.com",
                "password": PASSWORD,
                "password_confirmation": PASSWORD,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
    assert_eq!(body["errors"]["email"][0], "The email has already been taken.");
}

#[tokio::test]
async fn mismatched_confirmation_is_rejected() {
    let app = TestApp::new();
    let (status, body) = app
        .call(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "name": "Siti",
                "email": "siti@example.com",
                "password": PASSWORD,
                "password_confirmation": "something-else",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["password_confirmation"].is_array());
}

#[tokio::test]
async fn login_is_case_insensitive_and_rejects_bad_passwords() {
    let app = TestApp::new();
    app.register("Siti", "siti@example.com").await;

    let token = app.login("SITI@example.com", PASSWORD).await;
    assert!(!token.is_empty());

    let (status, body) = app
        .call(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "siti@example.com", "password": "wrong-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");
}

#[tokio::test]
async fn session_cookie_authenticates() {
    let app = TestApp::new();
    let user = app.register("Agus", "agus@example.com").await;
    let cookie = format!("session={}", user.token);

    let (status, body) = app
        .call_with("GET", "/api/auth/me", None, &[("cookie", cookie.as_str())], None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "agus@example.com");
}

#[tokio::test]
async fn logout_revokes_the_token() {
    let app = TestApp::new();
    let user = app.register("Dewi", "dewi@example.com").await;

    let (status, _) = app.call("POST", "/api/auth/logout", Some(&user.token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.get("/api/auth/me", &user.token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unauthenticated");
}

#[tokio::test]
async fn refresh_swaps_tokens() {
    let app = TestApp::new();
    let user = app.register("Rina", "rina@example.com").await;

    let (status, body) = app.call("POST", "/api/auth/refresh", Some(&user.token), None).await;
    assert_eq!(status, StatusCode::OK);
    let fresh = body["data"]["token"].as_str().unwrap().to_string();

    assert_eq!(app.get("/api/auth/me", &user.token).await.0, StatusCode::UNAUTHORIZED);
    assert_eq!(app.get("/api/auth/me", &fresh).await.0, StatusCode::OK);
}

#[tokio::test]
async fn requests_without_credentials_are_unauthenticated() {
    let app = TestApp::new();
    let (status, _) = app.call("GET", "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get("/api/auth/me", "not-a-jwt").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_needs_no_auth() {
    let app = TestApp::new();
    let (status, _) = app.call("GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn inactive_accounts_cannot_log_in() {
    let app = TestApp::new();
    let user = app.register("Rina", "rina@example.com").await;
    app.sql(&format!("UPDATE users SET is_active = 0 WHERE id = {}", user.user_id));

    let (status, body) = app
        .call(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "rina@example.com", "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Account is inactive");

    assert_eq!(app.get("/api/auth/me", &user.token).await.0, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn bearer_header_wins_over_a_stale_cookie() {
    let app = TestApp::new();
    let user = app.register("Agus", "agus@example.com").await;

    let (status, body) = app
        .call_with(
            "GET",
            "/api/auth/me",
            Some(&user.token),
            &[("cookie", "session=stale-token")],
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "agus@example.com");
}

#[tokio::test]
async fn wrong_method_gets_the_error_envelope() {
    let app = TestApp::new();
    let (status, body) = app.call("DELETE", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Method Not Allowed");
}

#[tokio::test]
async fn oversized_bodies_get_the_error_envelope() {
    let app = TestApp::new();
    let limit = app.ctx.configs.server.body_limit_bytes as usize;
    let (status, body) = app
        .call(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "big@example.com", "password": "x".repeat(limit + 1) })),
        )
        .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Payload too large");
}
