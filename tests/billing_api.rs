mod common;

use common::TestApp;
use serde_json::{json, Value};
use warp::http::StatusCode;

const SECRET: &str = "device-secret-123";

fn residential_tier() -> Value {
    json!({
        "tier_name": "Residential 2025",
        "customer_tier": "residential",
        "pricing_model": "tiered",
        "price_ranges": [
            { "min_volume": 0.0, "max_volume": 10.0, "price_per_unit": 1000.0 },
            { "min_volume": 10.0, "price_per_unit": 2000.0 },
        ],
        "admin_fee": 2500.0,
        "minimum_charge": 5000.0,
    })
}

fn voucher(code: &str) -> Value {
    json!({
        "code": code,
        "name": "Hemat 10%",
        "discount_type": "percentage",
        "discount_value": 10.0,
        "max_discount_amount": 5000.0,
        "min_purchase_amount": 20000.0,
        "per_customer_limit": 1,
        "valid_from": "2020-01-01 00:00:00",
        "valid_until": "2099-12-31 23:59:59",
    })
}

#[tokio::test]
async fn tiered_bill_splits_volume_across_ranges() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let (status, _) = app.post("/api/pricing/tiers", &admin, residential_tier()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, token) = app.customer(&admin, "Budi", "budi@example.com").await;
    let (status, body) = app
        .post(
            "/api/pricing/calculate",
            &token,
            json!({ "customer_tier": "residential", "usage_volume": 15.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let bill = &body["data"]["bill"];
    assert_eq!(bill["usage_charge"], 20000.0);
    assert_eq!(bill["total"], 22500.0);
    assert_eq!(bill["breakdown"].as_array().unwrap().len(), 2);

    let (_, body) = app
        .post(
            "/api/pricing/calculate",
            &token,
            json!({ "customer_tier": "residential", "usage_volume": 1.0 }),
        )
        .await;
    assert_eq!(body["data"]["bill"]["total"], 7500.0);

    let (status, _) = app
        .post(
            "/api/pricing/calculate",
            &token,
            json!({ "customer_tier": "industrial", "usage_volume": 1.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn tier_writes_need_settings_edit() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let (_, token) = app.customer(&admin, "Budi", "budi@example.com").await;

    let (status, _) = app.post("/api/pricing/tiers", &token, residential_tier()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let mut overlapping = residential_tier();
    overlapping["price_ranges"][1]["min_volume"] = json!(5.0);
    let (status, body) = app.post("/api/pricing/tiers", &admin, overlapping).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["price_ranges"][0], "Price ranges must not overlap.");
}

#[tokio::test]
async fn seeded_defaults_are_installed_once() {
    let app = TestApp::new();
    let admin = app.admin_token().await;

    let (status, body) = app.call("POST", "/api/pricing/seed-defaults", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["created"].as_i64().unwrap() > 0);

    let (_, body) = app.call("POST", "/api/pricing/seed-defaults", Some(&admin), None).await;
    assert_eq!(body["data"]["created"], 0);
}

#[tokio::test]
async fn readings_are_priced_by_the_property_tier() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    app.post("/api/pricing/tiers", &admin, residential_tier()).await;
    let (customer, _) = app.customer(&admin, "Budi", "budi@example.com").await;
    let meter = app.meter(&admin, customer["id"].as_i64().unwrap()).await;
    app.iot_device(&admin, "IOT-1", meter["id"].as_i64(), SECRET).await;

    app.reading("IOT-1", SECRET, json!({ "total_volume": 0.0 })).await;
    let (_, body) = app.reading("IOT-1", SECRET, json!({ "total_volume": 12.0 })).await;
    assert_eq!(body["data"]["usage"]["cost"], 14000.0);

    // the month-to-date volume already sits in the upper range
    let (_, body) = app.reading("IOT-1", SECRET, json!({ "total_volume": 13.0 })).await;
    assert_eq!(body["data"]["usage"]["cost"], 2000.0);
}

#[tokio::test]
async fn voucher_validation_reports_discount_and_refusals() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let (status, created) = app.post("/api/vouchers", &admin, voucher("hemat10")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["data"]["code"], "HEMAT10");

    let (status, _) = app.post("/api/vouchers", &admin, voucher("HEMAT10")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, token) = app.customer(&admin, "Budi", "budi@example.com").await;
    let (status, body) = app
        .post("/api/vouchers/validate", &token, json!({ "code": "hemat10", "amount": 100000.0 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["discount_amount"], 5000.0);
    assert_eq!(body["data"]["final_amount"], 95000.0);

    let (status, body) = app
        .post("/api/vouchers/validate", &token, json!({ "code": "HEMAT10", "amount": 10000.0 }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["code"][0], "Minimum purchase amount for this voucher is 20000.00.");

    let (status, _) = app
        .post("/api/vouchers/validate", &token, json!({ "code": "NOPE", "amount": 100000.0 }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn payment_lifecycle_credits_and_refunds_the_balance() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    app.post("/api/vouchers", &admin, voucher("HEMAT10")).await;
    let (customer, token) = app.customer(&admin, "Budi", "budi@example.com").await;

    let (status, created) = app
        .post(
            "/api/payments",
            &token,
            json!({ "amount": 100000.0, "payment_method": "bank_transfer", "voucher_code": "hemat10" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let payment = &created["data"];
    assert_eq!(payment["status"], "pending");
    assert_eq!(payment["customer_id"], customer["id"]);
    assert_eq!(payment["discount_amount"], 5000.0);
    assert_eq!(payment["final_amount"], 95000.0);
    assert!(payment["reference_id"].as_str().unwrap().starts_with("PAY"));
    assert!(payment["expired_at"].is_string());

    let uuid = payment["uuid"].as_str().unwrap();
    let confirm = format!("/api/payments/{}/confirm", uuid);
    let (status, _) = app.call("POST", &confirm, Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.call("POST", &confirm, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["payment"]["status"], "paid");
    assert_eq!(body["data"]["balance"], 100000.0);

    let (status, body) = app.call("POST", &confirm, Some(&admin), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "Only pending payments can be confirmed.");

    // the voucher allows one use per customer
    let (status, body) = app
        .post(
            "/api/payments",
            &token,
            json!({ "amount": 50000.0, "payment_method": "qris", "voucher_code": "HEMAT10" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["voucher_code"].is_array());

    let refund = format!("/api/payments/{}/refund", uuid);
    let (status, body) = app.call("POST", &refund, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["payment"]["status"], "refunded");
    assert_eq!(body["data"]["balance"], 0.0);

    let (_, activities) = app.get("/api/activities?type=payment_confirmed", &admin).await;
    assert_eq!(activities["data"]["total"], 1);
}

#[tokio::test]
async fn customers_only_list_their_own_payments() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let (_, budi) = app.customer(&admin, "Budi", "budi@example.com").await;
    let (_, siti) = app.customer(&admin, "Siti", "siti@example.com").await;

    let (_, created) = app
        .post("/api/payments", &budi, json!({ "amount": 25000.0, "payment_method": "qris" }))
        .await;
    app.post("/api/payments", &siti, json!({ "amount": 30000.0, "payment_method": "qris" }))
        .await;

    let (_, list) = app.get("/api/payments", &budi).await;
    assert_eq!(list["data"]["total"], 1);
    let (_, list) = app.get("/api/payments", &admin).await;
    assert_eq!(list["data"]["total"], 2);

    let path = format!("/api/payments/{}", created["data"]["uuid"].as_str().unwrap());
    assert_eq!(app.get(&path, &siti).await.0, StatusCode::NOT_FOUND);
    assert_eq!(app.get(&path, &budi).await.0, StatusCode::OK);

    let (status, body) = app
        .post("/api/payments", &budi, json!({ "amount": 0.0, "payment_method": "cash" }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["amount"].is_array());
    assert!(body["errors"]["payment_method"].is_array());
}

#[tokio::test]
async fn single_use_voucher_is_checked_again_at_confirmation() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    app.post("/api/vouchers", &admin, voucher("HEMAT10")).await;
    let (_, token) = app.customer(&admin, "Budi", "budi@example.com").await;

    let mut pending = Vec::new();
    for amount in [100000.0, 60000.0] {
        let (status, created) = app
            .post(
                "/api/payments",
                &token,
                json!({ "amount": amount, "payment_method": "qris", "voucher_code": "HEMAT10" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        pending.push(created["data"]["uuid"].as_str().unwrap().to_string());
    }

    let first = format!("/api/payments/{}/confirm", pending[0]);
    let (status, _) = app.call("POST", &first, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);

    let second = format!("/api/payments/{}/confirm", pending[1]);
    let (status, body) = app.call("POST", &second, Some(&admin), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["errors"]["voucher_code"][0],
        "You have already used this voucher the maximum number of times."
    );

    let (_, payment) = app.get(&format!("/api/payments/{}", pending[1]), &admin).await;
    assert_eq!(payment["data"]["status"], "pending");
    let (_, me) = app.get("/api/auth/me", &token).await;
    assert_eq!(me["data"]["customer"]["balance"], 100000.0);
}

#[tokio::test]
async fn exhausted_usage_limit_refuses_other_customers() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let mut shared = voucher("SEKALI");
    shared["usage_limit"] = json!(1);
    shared["per_customer_limit"] = json!(5);
    let (status, _) = app.post("/api/vouchers", &admin, shared).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, budi) = app.customer(&admin, "Budi", "budi@example.com").await;
    let (_, siti) = app.customer(&admin, "Siti", "siti@example.com").await;
    let (_, created) = app
        .post(
            "/api/payments",
            &budi,
            json!({ "amount": 50000.0, "payment_method": "qris", "voucher_code": "SEKALI" }),
        )
        .await;
    let confirm = format!("/api/payments/{}/confirm", created["data"]["uuid"].as_str().unwrap());
    assert_eq!(app.call("POST", &confirm, Some(&admin), None).await.0, StatusCode::OK);

    let (status, body) = app
        .post("/api/vouchers/validate", &siti, json!({ "code": "SEKALI", "amount": 50000.0 }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["code"][0], "Voucher usage limit has been reached.");
}

#[tokio::test]
async fn expired_payments_cannot_be_confirmed() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let (_, token) = app.customer(&admin, "Budi", "budi@example.com").await;
    let (_, created) = app
        .post("/api/payments", &token, json!({ "amount": 25000.0, "payment_method": "qris" }))
        .await;
    let uuid = created["data"]["uuid"].as_str().unwrap();
    app.sql(&format!(
        "UPDATE payments SET expired_at = '2020-01-01 00:00:00' WHERE uuid = '{}'",
        uuid
    ));

    let (status, body) = app
        .call("POST", &format!("/api/payments/{}/confirm", uuid), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "Payment has expired.");

    let (_, payment) = app.get(&format!("/api/payments/{}", uuid), &admin).await;
    assert_eq!(payment["data"]["status"], "expired");
}

#[tokio::test]
async fn huge_page_numbers_return_an_empty_page() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    app.customer(&admin, "Budi", "budi@example.com").await;

    let (status, body) = app
        .get("/api/customers?page=9223372036854775807&per_page=100", &admin)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["data"].as_array().unwrap().is_empty());
    assert_eq!(body["data"]["total"], 1);

    let (status, body) = app.get("/api/payments?page=-4", &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["current_page"], 1);
}
