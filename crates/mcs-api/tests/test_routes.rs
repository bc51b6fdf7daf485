mod common;

use axum::http::StatusCode;

use common::test_app;

#[tokio::test]
async fn root_welcomes() {
    let app = test_app();
    let (status, body) = app.get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        "Welcome to the Minecraft Server Hosting API!"
    );
}

#[tokio::test]
async fn healthz_is_ok() {
    let app = test_app();
    let (status, body) = app.get("/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn plans_are_listed_by_id() {
    let app = test_app();
    let (status, body) = app.get("/plans").await;
    assert_eq!(status, StatusCode::OK);
    let plans = body.as_array().unwrap();
    assert_eq!(plans.len(), 2);
    assert_eq!(plans[0]["id"], "basic");
    assert_eq!(plans[0]["memoryGb"], 2);
    assert_eq!(plans[1]["id"], "pro");
    assert_eq!(plans[1]["memoryGb"], 8);
}
