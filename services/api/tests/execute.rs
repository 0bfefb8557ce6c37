//! The execution relay and language catalog.

mod common;

use axum::http::StatusCode;
use common::{TestApp, REJECTED_LANGUAGE};
use serde_json::json;

#[tokio::test]
async fn provider_results_are_relayed_verbatim() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post(
            "/api/judge0/execute",
            json!({ "source_code": "print(input())", "language_id": 71, "stdin": "42" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stdout"], "42");
    assert_eq!(body["status"]["description"], "Accepted");
}

#[tokio::test]
async fn provider_failures_keep_their_status() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post(
            "/api/judge0/execute",
            json!({ "source_code": "x", "language_id": REJECTED_LANGUAGE }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "EXECUTION_FAILED");
    assert_eq!(body["error"], "Failed to submit code to Judge0");
}

#[tokio::test]
async fn submissions_need_source_and_language() {
    let app = TestApp::new().await;

    let (status, body) = app.post("/api/judge0/execute", json!({ "language_id": 71 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MISSING_SOURCE_CODE");

    let (status, body) = app.post("/api/judge0/execute", json!({ "source_code": "x" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MISSING_LANGUAGE_ID");
}

#[tokio::test]
async fn language_catalog_is_served() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/languages").await;
    assert_eq!(status, StatusCode::OK);
    let python = body
        .as_array()
        .unwrap()
        .iter()
        .find(|l| l["editorId"] == "python")
        .expect("python listed");
    assert_eq!(python["id"], 71);
    assert_eq!(python["extension"], "py");
}
