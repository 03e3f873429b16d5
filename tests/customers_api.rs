mod common;

use common::TestApp;
use serde_json::json;
use warp::http::StatusCode;

#[tokio::test]
async fn admin_manages_customers() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let (customer, _) = app.customer(&admin, "Budi Santoso", "budi@example.com").await;
    assert!(customer["customer_number"].as_str().unwrap().starts_with("CUST"));
    assert_eq!(customer["balance"], 0.0);
    assert_eq!(customer["status"], "active");

    let (status, list) = app.get("/api/customers?search=Budi", &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["data"]["total"], 1);
    assert_eq!(list["data"]["data"][0]["email"], "budi@example.com");

    let path = format!("/api/customers/{}", customer["uuid"].as_str().unwrap());
    let (status, updated) = app
        .call("PUT", &path, Some(&admin), Some(json!({ "city": "Jakarta" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["city"], "Jakarta");

    let (status, _) = app.call("DELETE", &path, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = app.get(&path, &admin).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn one_profile_per_user() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let (customer, _) = app.customer(&admin, "Budi", "budi@example.com").await;

    let (status, body) = app
        .post(
            "/api/customers",
            &admin,
            json!({
                "user_id": customer["user_id"],
                "full_name": "Budi Lagi",
                "email": "budi2@example.com",
                "phone": "0811",
                "address": "Jl. Lain",
                "city": "Bandung",
                "province": "Jawa Barat",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["user_id"].is_array());
}

#[tokio::test]
async fn missing_fields_are_reported_per_field() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let user = app.register("Siti", "siti@example.com").await;

    let (status, body) = app
        .post(
            "/api/customers",
            &admin,
            json!({ "user_id": user.user_id, "email": "not-an-email" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["full_name"][0], "The full name field is required.");
    assert_eq!(body["errors"]["email"][0], "The email must be a valid email address.");
}

#[tokio::test]
async fn customers_cannot_browse_other_customers() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let (_, token) = app.customer(&admin, "Budi", "budi@example.com").await;

    let (status, _) = app.get("/api/customers", &token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn meters_inherit_the_property_customer() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let (customer, _) = app.customer(&admin, "Budi", "budi@example.com").await;
    let meter = app.meter(&admin, customer["id"].as_i64().unwrap()).await;
    assert_eq!(meter["customer_id"], customer["id"]);
    assert_eq!(meter["connection_status"], "offline");
    assert!(meter["device_number"].as_str().unwrap().starts_with("DEV"));

    let (status, stats) = app.get("/api/devices/summary/stats", &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["data"]["total"], 1);
    assert_eq!(stats["data"]["by_type"]["water_meter"], 1);

    let (status, body) = app
        .post(
            "/api/devices",
            &admin,
            json!({
                "property_id": 9999,
                "device_name": "Ghost",
                "device_type": "water_meter",
                "serial_number": "SN-X",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["property_id"].is_array());
}
