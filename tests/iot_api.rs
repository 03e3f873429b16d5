mod common;

use common::TestApp;
use indowater_api::{modules::iot::sweeper::sweep_once, shared::config::IotConfig};
use serde_json::{json, Value};
use warp::{http::StatusCode, ws::Message};

const SECRET: &str = "device-secret-123";

fn alert_types(body: &Value) -> Vec<String> {
    body["data"]["alerts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|alert| alert["alert_type"].as_str().unwrap().to_string())
        .collect()
}

fn event(message: Message) -> Value {
    serde_json::from_str(message.to_str().unwrap()).unwrap()
}

#[tokio::test]
async fn readings_need_the_device_secret() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    app.iot_device(&admin, "IOT-1", None, SECRET).await;

    let (status, body) = app.reading("IOT-1", "wrong", json!({ "flow_rate": 1.0 })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid device credentials");

    let (status, _) = app.reading("IOT-404", SECRET, json!({ "flow_rate": 1.0 })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.reading("IOT-1", SECRET, json!({ "flow_rate": 1.0 })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["reading"]["flow_rate"], 1.0);
}

#[tokio::test]
async fn duplicate_device_ids_are_refused() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    app.iot_device(&admin, "IOT-1", None, SECRET).await;

    let (status, body) = app
        .post(
            "/api/iot/devices/register",
            &admin,
            json!({ "device_id": "IOT-1", "device_name": "Again" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["device_id"].is_array());
}

#[tokio::test]
async fn generated_secret_is_returned_once() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let (status, body) = app
        .post(
            "/api/iot/devices/register",
            &admin,
            json!({ "device_id": "IOT-9", "device_name": "Gateway" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let secret = body["data"]["secret"].as_str().unwrap().to_string();
    assert!(body["data"]["device"].get("secret_hash").is_none());

    let (status, _) = app.reading("IOT-9", &secret, json!({ "pressure": 2.1 })).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn meter_deltas_are_billed_against_the_balance() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let (customer, token) = app.customer(&admin, "Budi", "budi@example.com").await;
    let meter = app.meter(&admin, customer["id"].as_i64().unwrap()).await;
    app.iot_device(&admin, "IOT-1", meter["id"].as_i64(), SECRET).await;

    // first reading is the baseline
    let (status, body) = app.reading("IOT-1", SECRET, json!({ "total_volume": 100.0 })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["data"]["usage"].is_null());

    // no pricing tier: the configured default rate applies
    let (_, body) = app.reading("IOT-1", SECRET, json!({ "total_volume": 102.0 })).await;
    let usage = &body["data"]["usage"];
    assert_eq!(usage["consumption"], 2.0);
    assert_eq!(usage["cost"], 10000.0);
    assert_eq!(usage["previous_reading"], 100.0);
    assert!(alert_types(&body).contains(&String::from("low_balance")));

    let (_, me) = app.get("/api/auth/me", &token).await;
    assert_eq!(me["data"]["customer"]["balance"], -10000.0);

    let (_, body) = app.reading("IOT-1", SECRET, json!({ "total_volume": 102.0 })).await;
    assert!(body["data"]["usage"].is_null());

    let (_, body) = app.reading("IOT-1", SECRET, json!({ "total_volume": 101.0 })).await;
    let usage = &body["data"]["usage"];
    assert_eq!(usage["is_anomaly"], true);
    assert_eq!(usage["anomaly_type"], "meter_rollback");
    assert_eq!(usage["cost"], 0.0);

    let (status, list) = app.get("/api/water-usage", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["data"]["total"], 2);
}

#[tokio::test]
async fn high_flow_raises_one_open_leak_alert() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let (customer, token) = app.customer(&admin, "Budi", "budi@example.com").await;
    let meter = app.meter(&admin, customer["id"].as_i64().unwrap()).await;
    app.iot_device(&admin, "IOT-1", meter["id"].as_i64(), SECRET).await;

    let (_, body) = app.reading("IOT-1", SECRET, json!({ "flow_rate": 80.0 })).await;
    assert_eq!(alert_types(&body), vec!["leak_detected"]);

    let (_, body) = app.reading("IOT-1", SECRET, json!({ "flow_rate": 90.0 })).await;
    assert!(alert_types(&body).is_empty());

    let (status, alerts) = app.get("/api/alerts?alert_type=leak_detected", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(alerts["data"]["total"], 1);
    let alert = &alerts["data"]["data"][0];
    assert_eq!(alert["severity"], "critical");

    let path = format!("/api/alerts/{}/read", alert["uuid"].as_str().unwrap());
    let (status, read) = app.call("PATCH", &path, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(read["data"]["is_read"], true);

    let (status, leaks) = app.get("/api/iot/leak-events", &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(leaks["data"]["total"], 1);
    let leak = &leaks["data"]["data"][0];
    assert_eq!(leak["alert_id"], alert["id"]);
    assert_eq!(leak["device_id"], meter["id"]);
    assert_eq!(leak["severity"], "moderate");
    assert_eq!(leak["detected_flow_rate"], 80.0);
    assert_eq!(leak["normal_flow_rate"], 50.0);
    assert_eq!(leak["status"], "detected");

    assert_eq!(app.get("/api/iot/leak-events", &token).await.0, StatusCode::FORBIDDEN);

    let path = format!("/api/iot/leak-events/{}", leak["uuid"].as_str().unwrap());
    let (status, resolved) = app
        .call(
            "PATCH",
            &path,
            Some(&admin),
            Some(json!({ "status": "resolved", "notes": "Valve replaced", "estimated_loss": 120.5 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resolved["data"]["status"], "resolved");
    assert!(resolved["data"]["resolved_at"].is_string());

    let (status, body) = app
        .call("PATCH", &path, Some(&admin), Some(json!({ "status": "fixed" })))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["status"].is_array());
}

#[tokio::test]
async fn disabled_leak_alerts_stay_quiet() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let (customer, token) = app.customer(&admin, "Budi", "budi@example.com").await;
    let meter = app.meter(&admin, customer["id"].as_i64().unwrap()).await;
    app.iot_device(&admin, "IOT-1", meter["id"].as_i64(), SECRET).await;

    let (status, prefs) = app
        .call("PUT", "/api/alerts/preferences", Some(&token), Some(json!({ "leak_alerts": false })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(prefs["data"]["leak_alerts"], false);

    let (_, body) = app.reading("IOT-1", SECRET, json!({ "flow_rate": 80.0 })).await;
    assert!(alert_types(&body).is_empty());
}

#[tokio::test]
async fn customers_only_see_their_own_modules() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let (budi, budi_token) = app.customer(&admin, "Budi", "budi@example.com").await;
    let (siti, _) = app.customer(&admin, "Siti", "siti@example.com").await;
    let budi_meter = app.meter(&admin, budi["id"].as_i64().unwrap()).await;
    let siti_meter = app.meter(&admin, siti["id"].as_i64().unwrap()).await;
    app.iot_device(&admin, "IOT-B", budi_meter["id"].as_i64(), SECRET).await;
    app.iot_device(&admin, "IOT-S", siti_meter["id"].as_i64(), SECRET).await;

    let (status, body) = app.get("/api/iot/devices/list", &budi_token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["devices"][0]["device_id"], "IOT-B");

    let (status, _) = app.get("/api/iot/metrics/realtime/IOT-S", &budi_token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app.get("/api/iot/devices/list", &admin).await;
    assert_eq!(body["total"], 2);
}

#[tokio::test]
async fn history_is_streamed_oldest_first() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    app.iot_device(&admin, "IOT-1", None, SECRET).await;
    app.reading("IOT-1", SECRET, json!({ "flow_rate": 1.0, "timestamp": "2020-01-01T00:00:00Z" }))
        .await;
    app.reading("IOT-1", SECRET, json!({ "flow_rate": 2.0 })).await;
    app.reading("IOT-1", SECRET, json!({ "flow_rate": 3.0 })).await;

    let (status, body) = app.get("/api/iot/metrics/history/IOT-1?hours=6", &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hours"], 6);
    let flows: Vec<f64> = body["readings"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["flow_rate"].as_f64().unwrap())
        .collect();
    assert_eq!(flows, vec![2.0, 3.0]);

    let (status, _) = app.get("/api/iot/metrics/history/IOT-1?hours=500", &admin).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn silent_devices_are_swept_offline() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    app.iot_device(&admin, "IOT-1", None, SECRET).await;

    let (status, body) = app
        .call_with(
            "POST",
            "/api/iot/heartbeat",
            None,
            &[("x-device-secret", SECRET)],
            Some(json!({ "device_id": "IOT-1", "battery_level": 88 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["connection_status"], "online");

    let fresh = IotConfig::default();
    assert_eq!(sweep_once(&app.ctx.pool, &app.ctx.hub, &fresh).await.unwrap(), 0);

    let expired = IotConfig {
        offline_after_secs: -60,
        ..IotConfig::default()
    };
    assert_eq!(sweep_once(&app.ctx.pool, &app.ctx.hub, &expired).await.unwrap(), 1);

    let (_, body) = app.get("/api/iot/metrics/realtime/IOT-1", &admin).await;
    assert_eq!(body["status"], "offline");
}

#[tokio::test]
async fn websocket_subscribers_receive_readings() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    app.iot_device(&admin, "IOT-1", None, SECRET).await;

    let mut client = warp::test::ws()
        .path(&format!("/api/iot/ws/session-1?token={}", admin))
        .handshake(indowater_api::modules::api::routes(&app.ctx))
        .await
        .expect("handshake");

    let connected = event(client.recv().await.unwrap());
    assert_eq!(connected["type"], "connected");
    assert_eq!(connected["data"]["session_id"], "session-1");

    client
        .send_text(json!({ "type": "subscribe", "device_id": "IOT-1" }).to_string())
        .await;
    let subscribed = event(client.recv().await.unwrap());
    assert_eq!(subscribed["type"], "subscribed");
    assert_eq!(subscribed["device_id"], "IOT-1");
    assert_eq!(subscribed["data"]["subscriptions"], json!(["IOT-1"]));

    app.reading("IOT-1", SECRET, json!({ "flow_rate": 4.5 })).await;
    let reading = event(client.recv().await.unwrap());
    assert_eq!(reading["type"], "device_reading");
    assert_eq!(reading["data"]["flow_rate"], 4.5);
    let status = event(client.recv().await.unwrap());
    assert_eq!(status["type"], "device_status");

    client.send_text(json!({ "type": "ping" }).to_string()).await;
    assert_eq!(event(client.recv().await.unwrap())["type"], "pong");

    client.send_text("not json").await;
    assert_eq!(event(client.recv().await.unwrap())["type"], "error");
}

#[tokio::test]
async fn websocket_requires_a_token() {
    let app = TestApp::new();
    let result = warp::test::ws()
        .path("/api/iot/ws/session-1")
        .handshake(indowater_api::modules::api::routes(&app.ctx))
        .await;
    assert!(result.is_err());
}

async fn connect(app: &TestApp, session_id: &str, token: &str) -> warp::test::WsClient {
    let mut client = warp::test::ws()
        .path(&format!("/api/iot/ws/{}?token={}", session_id, token))
        .handshake(indowater_api::modules::api::routes(&app.ctx))
        .await
        .expect("handshake");
    assert_eq!(event(client.recv().await.unwrap())["type"], "connected");
    client
}

#[tokio::test]
async fn placeholder_session_ids_are_bad_requests() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let upgrade = [
        ("connection", "upgrade"),
        ("upgrade", "websocket"),
        ("sec-websocket-version", "13"),
        ("sec-websocket-key", "dGhlIHNhbXBsZSBub25jZQ=="),
    ];
    for path in ["/api/iot/ws/undefined", "/api/iot/ws/null", "/api/iot/ws/"] {
        let (status, body) = app
            .call_with("GET", &format!("{}?token={}", path, admin), None, &upgrade, None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", path);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Invalid session id");
    }
}

#[tokio::test]
async fn bad_client_messages_keep_the_session_open() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let mut client = connect(&app, "session-1", &admin).await;

    client.send_text("{ not json").await;
    let reply = event(client.recv().await.unwrap());
    assert_eq!(reply["type"], "error");
    assert!(reply["data"]["message"].as_str().unwrap().starts_with("Invalid message"));

    client.send_text(json!({ "type": "explode" }).to_string()).await;
    assert_eq!(event(client.recv().await.unwrap())["type"], "error");

    client
        .send_text(json!({ "type": "subscribe", "device_id": "IOT-404" }).to_string())
        .await;
    assert_eq!(event(client.recv().await.unwrap())["type"], "error");

    client.send_text(json!({ "type": "ping" }).to_string()).await;
    assert_eq!(event(client.recv().await.unwrap())["type"], "pong");
    assert_eq!(app.ctx.hub.session_count().await, 1);
}

#[tokio::test]
async fn reconnecting_with_a_session_id_replaces_the_old_socket() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    app.iot_device(&admin, "IOT-1", None, SECRET).await;

    let mut old = connect(&app, "session-1", &admin).await;
    let mut new = connect(&app, "session-1", &admin).await;
    assert_eq!(app.ctx.hub.session_count().await, 1);

    // the replaced socket is closed by the server
    assert!(old.recv().await.map_or(true, |message| message.is_close()));

    new.send_text(json!({ "type": "subscribe", "device_id": "IOT-1" }).to_string())
        .await;
    assert_eq!(event(new.recv().await.unwrap())["type"], "subscribed");
    app.reading("IOT-1", SECRET, json!({ "flow_rate": 2.0 })).await;
    assert_eq!(event(new.recv().await.unwrap())["type"], "device_reading");
}
