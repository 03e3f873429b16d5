mod common;

use common::TestApp;
use indowater_api::{
    modules::mqtt::{handle_heartbeat, handle_reading, reading_worker},
    shared::{config::IotConfig, errors::ErrorType},
};
use serde_json::json;

const SECRET: &str = "device-secret-123";

#[tokio::test]
async fn published_readings_use_the_http_ingestion_path() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    app.iot_device(&admin, "IOT-1", None, SECRET).await;
    let config = IotConfig::default();

    let payload = json!({ "device_id": "IOT-1", "secret": SECRET, "flow_rate": 3.25 }).to_string();
    handle_reading(&app.ctx.pool, &app.ctx.hub, &config, &payload).await.unwrap();

    let (_, body) = app.get("/api/iot/metrics/realtime/IOT-1", &admin).await;
    assert_eq!(body["status"], "online");
    assert_eq!(body["metrics"]["flow_rate"], 3.25);
}

#[tokio::test]
async fn bad_payloads_and_secrets_are_dropped() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    app.iot_device(&admin, "IOT-1", None, SECRET).await;
    let config = IotConfig::default();

    let err = handle_reading(&app.ctx.pool, &app.ctx.hub, &config, "{not json")
        .await
        .unwrap_err();
    assert_eq!(err.err_type, ErrorType::BadRequest);

    let payload = json!({ "device_id": "IOT-1", "secret": "wrong" }).to_string();
    let err = handle_heartbeat(&app.ctx.pool, &app.ctx.hub, &payload).await.unwrap_err();
    assert_eq!(err.err_type, ErrorType::AuthError);

    let (_, body) = app.get("/api/iot/metrics/realtime/IOT-1", &admin).await;
    assert_eq!(body["status"], "offline");
}

#[tokio::test]
async fn heartbeats_bring_modules_online() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    app.iot_device(&admin, "IOT-1", None, SECRET).await;

    let payload = json!({ "device_id": "IOT-1", "secret": SECRET, "battery_level": 70, "rebooted": true }).to_string();
    handle_heartbeat(&app.ctx.pool, &app.ctx.hub, &payload).await.unwrap();

    let (_, body) = app.get("/api/iot/devices/list", &admin).await;
    let device = &body["devices"][0];
    assert_eq!(device["connection_status"], "online");
    assert_eq!(device["battery_level"], 70);
}

#[tokio::test]
async fn queued_readings_are_billed_in_arrival_order() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let (customer, token) = app.customer(&admin, "Budi", "budi@example.com").await;
    let meter = app.meter(&admin, customer["id"].as_i64().unwrap()).await;
    app.iot_device(&admin, "IOT-1", meter["id"].as_i64(), SECRET).await;

    let (tx, worker) = reading_worker(app.ctx.pool.clone(), app.ctx.hub.clone(), IotConfig::default());
    for volume in [100.0, 110.0, 120.0, 130.0] {
        let payload = json!({ "device_id": "IOT-1", "secret": SECRET, "total_volume": volume }).to_string();
        tx.send(payload).unwrap();
    }
    drop(tx);
    worker.await.unwrap();

    let (_, list) = app.get("/api/water-usage?anomaly=true", &token).await;
    assert_eq!(list["data"]["total"], 0);
    let (_, list) = app.get("/api/water-usage", &token).await;
    assert_eq!(list["data"]["total"], 3);
    let (_, me) = app.get("/api/auth/me", &token).await;
    assert_eq!(me["data"]["customer"]["balance"], -150000.0);
}
