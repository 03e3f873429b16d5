mod common;

use common::TestApp;
use serde_json::json;
use warp::http::StatusCode;

async fn open_ticket(app: &TestApp, token: &str) -> String {
    let (status, body) = app
        .post(
            "/api/tickets",
            token,
            json!({
                "category": "technical",
                "subject": "Meter not reporting",
                "description": "No readings since yesterday.",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["status"], "open");
    assert_eq!(body["data"]["priority"], "medium");
    assert!(body["data"]["ticket_number"].as_str().unwrap().starts_with("TKT"));
    body["data"]["uuid"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn customers_open_and_follow_their_tickets() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let (_, budi) = app.customer(&admin, "Budi", "budi@example.com").await;
    let (_, siti) = app.customer(&admin, "Siti", "siti@example.com").await;
    let uuid = open_ticket(&app, &budi).await;
    let path = format!("/api/tickets/{}", uuid);

    assert_eq!(app.get(&path, &budi).await.0, StatusCode::OK);
    assert_eq!(app.get(&path, &siti).await.0, StatusCode::NOT_FOUND);

    let (_, list) = app.get("/api/tickets", &siti).await;
    assert_eq!(list["data"]["total"], 0);
    let (_, list) = app.get("/api/tickets", &admin).await;
    assert_eq!(list["data"]["total"], 1);

    let (status, _) = app
        .call(
            "PATCH",
            &format!("{}/status", path),
            Some(&budi),
            Some(json!({ "status": "closed" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn assignment_moves_open_tickets_in_progress() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let (_, budi) = app.customer(&admin, "Budi", "budi@example.com").await;
    let technician = app.register("Teknisi", "teknisi@example.com").await;
    let uuid = open_ticket(&app, &budi).await;

    let (status, body) = app
        .call(
            "PATCH",
            &format!("/api/tickets/{}/assign", uuid),
            Some(&admin),
            Some(json!({ "assigned_to": technician.user_id })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "in_progress");
    assert_eq!(body["data"]["assigned_to"], technician.user_id);

    let (status, body) = app
        .call(
            "PATCH",
            &format!("/api/tickets/{}/assign", uuid),
            Some(&admin),
            Some(json!({ "assigned_to": 9999 })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["assigned_to"].is_array());
}

#[tokio::test]
async fn internal_notes_are_hidden_from_customers() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let (_, budi) = app.customer(&admin, "Budi", "budi@example.com").await;
    let uuid = open_ticket(&app, &budi).await;
    let messages = format!("/api/tickets/{}/messages", uuid);

    let (status, body) = app
        .post(&messages, &admin, json!({ "message": "Check the gateway first.", "is_internal": true }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["message_type"], "staff");

    let (_, body) = app
        .post(&messages, &budi, json!({ "message": "Any news?", "is_internal": true }))
        .await;
    assert_eq!(body["data"]["message_type"], "customer");
    assert_eq!(body["data"]["is_internal"], false);

    let path = format!("/api/tickets/{}", uuid);
    let (_, detail) = app.get(&path, &budi).await;
    assert_eq!(detail["data"]["messages"].as_array().unwrap().len(), 1);
    assert!(detail["data"]["response_time"].is_number());

    let (_, detail) = app.get(&path, &admin).await;
    assert_eq!(detail["data"]["messages"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn status_flow_is_enforced() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let (_, budi) = app.customer(&admin, "Budi", "budi@example.com").await;
    let uuid = open_ticket(&app, &budi).await;
    let status_path = format!("/api/tickets/{}/status", uuid);

    let (status, body) = app
        .call(
            "PATCH",
            &status_path,
            Some(&admin),
            Some(json!({ "status": "resolved", "notes": "Gateway restarted." })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "resolved");
    assert!(body["data"]["resolved_at"].is_string());
    assert_eq!(body["data"]["resolution_notes"], "Gateway restarted.");

    let (status, body) = app
        .call("PATCH", &status_path, Some(&admin), Some(json!({ "status": "resolved" })))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["status"][0], "The ticket is already resolved.");

    let (status, _) = app
        .call("PATCH", &status_path, Some(&admin), Some(json!({ "status": "in_progress" })))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app
        .call("PATCH", &status_path, Some(&admin), Some(json!({ "status": "escalated" })))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, detail) = app.get(&format!("/api/tickets/{}", uuid), &budi).await;
    assert_eq!(detail["data"]["messages"][0]["message_type"], "system");

    let (status, body) = app
        .call("PATCH", &status_path, Some(&admin), Some(json!({ "status": "closed" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["closed_at"].is_string());

    let (status, _) = app
        .post(&format!("/api/tickets/{}/messages", uuid), &budi, json!({ "message": "Thanks" }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn only_the_owner_rates_finished_tickets() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let (_, budi) = app.customer(&admin, "Budi", "budi@example.com").await;
    let (_, siti) = app.customer(&admin, "Siti", "siti@example.com").await;
    let uuid = open_ticket(&app, &budi).await;
    let rating = format!("/api/tickets/{}/rating", uuid);

    let (status, _) = app.post(&rating, &budi, json!({ "rating": 5 })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    app.call(
        "PATCH",
        &format!("/api/tickets/{}/status", uuid),
        Some(&admin),
        Some(json!({ "status": "resolved" })),
    )
    .await;

    let (status, _) = app.post(&rating, &siti, json!({ "rating": 5 })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.post(&rating, &budi, json!({ "rating": 6 })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["rating"][0], "The rating must be between 1 and 5.");

    let (status, body) = app
        .post(&rating, &budi, json!({ "rating": 4, "feedback": "Quick fix" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["customer_rating"], 4);
    assert_eq!(body["data"]["customer_feedback"], "Quick fix");
}

#[tokio::test]
async fn attachments_are_listed_on_the_ticket() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let (_, budi) = app.customer(&admin, "Budi", "budi@example.com").await;
    let uuid = open_ticket(&app, &budi).await;

    let (status, _) = app
        .post(
            &format!("/api/tickets/{}/attachments", uuid),
            &budi,
            json!({ "file_name": "meter.jpg", "file_path": "tickets/meter.jpg", "file_size": 2048 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, detail) = app.get(&format!("/api/tickets/{}", uuid), &budi).await;
    assert_eq!(detail["data"]["attachments"][0]["file_name"], "meter.jpg");
}
