mod common;

use common::TestApp;
use serde_json::{json, Value};
use warp::http::StatusCode;

fn permission_id(grouped: &Value, category: &str, slug: &str) -> i64 {
    grouped[category]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["slug"] == slug)
        .and_then(|p| p["id"].as_i64())
        .unwrap()
}

#[tokio::test]
async fn seeded_roles_are_listed_for_admins_only() {
    let app = TestApp::new();
    let admin = app.admin_token().await;

    let (status, body) = app.get("/api/roles/list", &admin).await;
    assert_eq!(status, StatusCode::OK);
    let slugs: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|role| role["slug"].as_str().unwrap())
        .collect();
    assert!(slugs.contains(&"admin"));
    assert!(slugs.contains(&"technician"));
    assert!(slugs.contains(&"customer"));

    let user = app.register("Budi", "budi@example.com").await;
    let (status, body) = app.get("/api/roles/list", &user.token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Unauthorized. Required permission: roles.view");
}

#[tokio::test]
async fn custom_role_grants_its_permissions() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let user = app.register("Budi", "budi@example.com").await;

    let (_, grouped) = app.get("/api/roles/permissions", &admin).await;
    let view_customers = permission_id(&grouped["data"], "customers", "customers.view");

    let (status, role) = app
        .post(
            "/api/roles/create",
            &admin,
            json!({ "name": "Field Supervisor", "permissions": [view_customers] }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(role["data"]["slug"], "field-supervisor");
    assert_eq!(role["data"]["permissions"][0]["slug"], "customers.view");

    assert_eq!(app.get("/api/customers", &user.token).await.0, StatusCode::FORBIDDEN);

    let (status, assigned) = app
        .post(
            "/api/roles/assign",
            &admin,
            json!({ "user_id": user.user_id, "role_ids": [role["data"]["id"]] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(assigned["data"]["roles"][0]["slug"], "field-supervisor");

    assert_eq!(app.get("/api/customers", &user.token).await.0, StatusCode::OK);
}

#[tokio::test]
async fn duplicate_slugs_and_system_role_deletes_are_refused() {
    let app = TestApp::new();
    let admin = app.admin_token().await;

    let (status, body) = app
        .post("/api/roles/create", &admin, json!({ "name": "Technician", "permissions": [] }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["slug"][0], "The slug has already been taken.");

    let (_, roles) = app.get("/api/roles/list", &admin).await;
    let admin_role = roles["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|role| role["slug"] == "admin")
        .unwrap()
        .clone();
    let path = format!("/api/roles/{}", admin_role["uuid"].as_str().unwrap());
    let (status, _) = app.call("DELETE", &path, Some(&admin), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn initialize_is_idempotent() {
    let app = TestApp::new();
    let admin = app.admin_token().await;

    let (_, before) = app.get("/api/roles/list", &admin).await;
    let (status, _) = app.call("POST", "/api/roles/initialize", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, after) = app.get("/api/roles/list", &admin).await;
    assert_eq!(
        before["data"].as_array().unwrap().len(),
        after["data"].as_array().unwrap().len()
    );
}
