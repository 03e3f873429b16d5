mod common;

use common::TestApp;
use serde_json::{json, Value};
use warp::http::StatusCode;

async fn technician(app: &TestApp, admin: &str) -> common::Registered {
    let user = app.register("Teknisi", "teknisi@example.com").await;
    let (_, roles) = app.get("/api/roles/list", admin).await;
    let role_id = roles["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|role| role["slug"] == "technician")
        .map(|role| role["id"].clone())
        .unwrap();
    let (status, _) = app
        .post(
            "/api/roles/assign",
            admin,
            json!({ "user_id": user.user_id, "role_ids": [role_id] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    user
}

async fn open_work_order(app: &TestApp, token: &str, customer_id: &Value, device_id: &Value) -> Value {
    let (status, body) = app
        .post(
            "/api/work-orders",
            token,
            json!({
                "customer_id": customer_id,
                "device_id": device_id,
                "work_type": "repair",
                "title": "Replace leaking valve",
                "description": "Valve drips after the meter.",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["data"].clone()
}

async fn patch(app: &TestApp, path: &str, token: &str, body: Value) -> (StatusCode, Value) {
    app.call("PATCH", path, Some(token), Some(body)).await
}

#[tokio::test]
async fn work_orders_run_from_pending_to_completed() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let (customer, _) = app.customer(&admin, "Budi", "budi@example.com").await;
    let meter = app.meter(&admin, customer["id"].as_i64().unwrap()).await;
    let tech = technician(&app, &admin).await;

    let order = open_work_order(&app, &admin, &customer["id"], &meter["id"]).await;
    assert_eq!(order["status"], "pending");
    assert_eq!(order["priority"], "medium");
    assert!(order["work_order_number"].as_str().unwrap().starts_with("WO-"));
    let path = format!("/api/work-orders/{}", order["uuid"].as_str().unwrap());

    let (status, assigned) = patch(
        &app,
        &format!("{}/assign", path),
        &admin,
        json!({ "assigned_to": tech.user_id }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(assigned["data"]["status"], "assigned");
    assert_eq!(assigned["data"]["assigned_to"], tech.user_id);

    let status_path = format!("{}/status", path);
    let (status, body) = patch(&app, &status_path, &tech.token, json!({ "status": "completed" })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["status"][0], "The work order is assigned and cannot move to completed.");

    let (status, started) = patch(&app, &status_path, &tech.token, json!({ "status": "in_progress" })).await;
    assert_eq!(status, StatusCode::OK);
    assert!(started["data"]["started_at"].is_string());

    let (status, done) = patch(
        &app,
        &status_path,
        &tech.token,
        json!({
            "status": "completed",
            "work_summary": "Valve replaced",
            "labor_cost": 150000.0,
            "parts_cost": 45000.0,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(done["data"]["status"], "completed");
    assert_eq!(done["data"]["total_cost"], 195000.0);
    assert_eq!(done["data"]["actual_duration"], 0);
    assert!(done["data"]["completed_at"].is_string());

    let (status, _) = app
        .call("PUT", &path, Some(&admin), Some(json!({ "title": "Too late" })))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, list) = app
        .get(&format!("/api/work-orders?assigned_to={}&status=completed", tech.user_id), &tech.token)
        .await;
    assert_eq!(list["data"]["total"], 1);
}

#[tokio::test]
async fn work_orders_need_staff_and_known_references() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let (budi, budi_token) = app.customer(&admin, "Budi", "budi@example.com").await;
    let (siti, _) = app.customer(&admin, "Siti", "siti@example.com").await;
    let siti_meter = app.meter(&admin, siti["id"].as_i64().unwrap()).await;

    assert_eq!(app.get("/api/work-orders", &budi_token).await.0, StatusCode::FORBIDDEN);

    let (status, body) = app
        .post(
            "/api/work-orders",
            &admin,
            json!({
                "customer_id": budi["id"],
                "device_id": siti_meter["id"],
                "work_type": "teleport",
                "title": "Install",
                "description": "New meter",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["work_type"][0], "The selected work type is invalid.");

    let (status, body) = app
        .post(
            "/api/work-orders",
            &admin,
            json!({
                "customer_id": budi["id"],
                "device_id": siti_meter["id"],
                "work_type": "installation",
                "title": "Install",
                "description": "New meter",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["device_id"].is_array());

    let order = open_work_order(&app, &admin, &siti["id"], &siti_meter["id"]).await;
    let path = format!("/api/work-orders/{}", order["uuid"].as_str().unwrap());
    let (status, cancelled) = patch(&app, &format!("{}/status", path), &admin, json!({ "status": "cancelled" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["data"]["status"], "cancelled");

    let (status, _) = app.call("DELETE", &path, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.get(&path, &admin).await.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn maintenance_schedules_track_the_meter_dates() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let (customer, token) = app.customer(&admin, "Budi", "budi@example.com").await;
    let meter = app.meter(&admin, customer["id"].as_i64().unwrap()).await;

    let (status, created) = app
        .post(
            "/api/maintenance-schedules",
            &admin,
            json!({
                "device_id": meter["id"],
                "maintenance_type": "preventive",
                "title": "Quarterly calibration",
                "scheduled_at": "2099-03-01 09:00:00",
                "checklist": ["flush", "calibrate"],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", created);
    assert_eq!(created["data"]["status"], "scheduled");
    assert_eq!(created["data"]["checklist"], json!(["flush", "calibrate"]));

    let meter_path = format!("/api/devices/{}", meter["uuid"].as_str().unwrap());
    let (_, device) = app.get(&meter_path, &admin).await;
    assert!(device["data"]["next_maintenance_at"]
        .as_str()
        .unwrap()
        .starts_with("2099-03-01"));

    let (_, list) = app
        .get(
            &format!("/api/maintenance-schedules?customer_id={}&from=2099-01-01", customer["id"]),
            &admin,
        )
        .await;
    assert_eq!(list["data"]["total"], 1);
    let (status, body) = app.get("/api/maintenance-schedules?from=soon", &admin).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["from"].is_array());

    assert_eq!(app.get("/api/maintenance-schedules", &token).await.0, StatusCode::FORBIDDEN);

    let path = format!("/api/maintenance-schedules/{}", created["data"]["uuid"].as_str().unwrap());
    let (status, done) = app
        .call(
            "PUT",
            &path,
            Some(&admin),
            Some(json!({ "status": "completed", "actual_duration": 45 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(done["data"]["status"], "completed");
    assert!(done["data"]["completed_at"].is_string());
    let (_, device) = app.get(&meter_path, &admin).await;
    assert!(device["data"]["last_maintenance_at"].is_string());

    let (status, _) = app.call("DELETE", &path, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, list) = app.get("/api/maintenance-schedules", &admin).await;
    assert_eq!(list["data"]["total"], 0);
}
