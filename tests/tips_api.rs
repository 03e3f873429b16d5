mod common;

use common::TestApp;
use serde_json::{json, Value};
use warp::http::StatusCode;

fn tip(title: &str, status: &str) -> Value {
    json!({
        "title": title,
        "description": "Small habits that save water every day.",
        "category": "kitchen",
        "difficulty": "easy",
        "potential_savings_percentage": 15,
        "implementation_steps": ["Close the tap", " "],
        "tags": ["kitchen"],
        "status": status,
    })
}

async fn create(app: &TestApp, admin: &str, title: &str, status: &str) -> Value {
    let (code, body) = app.post("/api/tips", admin, tip(title, status)).await;
    assert_eq!(code, StatusCode::CREATED, "{}", body);
    body["data"].clone()
}

#[tokio::test]
async fn drafts_are_hidden_from_readers() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let (_, token) = app.customer(&admin, "Budi", "budi@example.com").await;
    let published = create(&app, &admin, "Fix dripping taps", "published").await;
    let draft = create(&app, &admin, "Harvest rain water", "draft").await;
    assert_eq!(published["implementation_steps"], json!(["Close the tap"]));

    let (status, list) = app.get("/api/tips", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["data"]["total"], 1);
    assert_eq!(list["data"]["data"][0]["title"], "Fix dripping taps");

    let draft_path = format!("/api/tips/{}", draft["uuid"].as_str().unwrap());
    assert_eq!(app.get(&draft_path, &token).await.0, StatusCode::NOT_FOUND);
    assert_eq!(app.get(&draft_path, &admin).await.0, StatusCode::OK);

    let (status, _) = app.post("/api/tips", &token, tip("Nope", "published")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn random_tips_respect_the_limit() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    for title in ["One", "Two", "Three", "Four"] {
        create(&app, &admin, title, "published").await;
    }

    let (_, body) = app.get("/api/tips/random", &admin).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 3);

    let (_, body) = app.get("/api/tips/random?limit=1", &admin).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (_, body) = app.get("/api/tips/random?limit=0", &admin).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn reading_a_tip_counts_a_view() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let created = create(&app, &admin, "Shorter showers", "published").await;
    let path = format!("/api/tips/{}", created["uuid"].as_str().unwrap());

    let (_, first) = app.get(&path, &admin).await;
    let (_, second) = app.get(&path, &admin).await;
    assert_eq!(
        second["data"]["view_count"].as_i64().unwrap(),
        first["data"]["view_count"].as_i64().unwrap() + 1
    );
}

#[tokio::test]
async fn likes_only_count_once_per_customer() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let (_, token) = app.customer(&admin, "Budi", "budi@example.com").await;
    let created = create(&app, &admin, "Full loads only", "published").await;
    let engage = format!("/api/tips/{}/engage", created["uuid"].as_str().unwrap());

    let (status, body) = app.post(&engage, &token, json!({ "action": "like" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["tip"]["like_count"], 1);
    assert_eq!(body["data"]["engagement"]["liked"], true);

    let (_, body) = app.post(&engage, &token, json!({ "action": "like" })).await;
    assert_eq!(body["data"]["tip"]["like_count"], 1);

    let (_, body) = app.post(&engage, &token, json!({ "action": "unlike" })).await;
    assert_eq!(body["data"]["tip"]["like_count"], 0);

    let (_, body) = app
        .post(&engage, &token, json!({ "action": "implement", "rating": 5, "notes": "Works" }))
        .await;
    assert_eq!(body["data"]["tip"]["implementation_count"], 1);
    assert_eq!(body["data"]["engagement"]["implementation_rating"], 5);

    let (status, body) = app.post(&engage, &token, json!({ "action": "share" })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["action"].is_array());

    let (status, _) = app.post(&engage, &admin, json!({ "action": "like" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn deleted_tips_disappear() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let created = create(&app, &admin, "Check the toilet", "published").await;
    let path = format!("/api/tips/{}", created["uuid"].as_str().unwrap());

    let (status, updated) = app
        .call("PUT", &path, Some(&admin), Some(json!({ "title": "Check the cistern" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["title"], "Check the cistern");

    assert_eq!(app.call("DELETE", &path, Some(&admin), None).await.0, StatusCode::OK);
    assert_eq!(app.get(&path, &admin).await.0, StatusCode::NOT_FOUND);
}
