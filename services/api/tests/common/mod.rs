//! Shared harness for driving the router in-process against an in-memory database.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use codelab_api::{adapters::DbAdapter, web::router, web::state::AppState};
use codelab_core::domain::ExecutionRequest;
use codelab_core::ports::{CodeExecutionService, PortError, PortResult};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower::ServiceExt;

/// Language id the stub provider rejects, to exercise the failure relay.
pub const REJECTED_LANGUAGE: i64 = 9999;

/// Echoes the submission back in a Judge0-shaped result.
pub struct StubExecutor;

#[async_trait]
impl CodeExecutionService for StubExecutor {
    async fn execute(&self, request: &ExecutionRequest) -> PortResult<Value> {
        if request.language_id == REJECTED_LANGUAGE {
            return Err(PortError::Upstream {
                status: 422,
                message: "language not supported".into(),
            });
        }
        Ok(json!({
            "stdout": request.stdin.clone().unwrap_or_default(),
            "status": { "id": 3, "description": "Accepted" },
            "language_id": request.language_id,
        }))
    }
}

pub struct TestApp {
    router: Router,
    pool: SqlitePool,
}

impl TestApp {
    pub async fn new() -> Self {
        let db = DbAdapter::in_memory().await.expect("in-memory database");
        let pool = db.pool().clone();
        let state = Arc::new(AppState {
            db: Arc::new(db),
            executor: Arc::new(StubExecutor),
        });
        Self {
            router: router(state),
            pool,
        }
    }

    /// Closes a lab session. No endpoint does this, so it goes straight to the table.
    pub async fn deactivate_lab(&self, lab_id: i64) {
        sqlx::query("UPDATE lab_sessions SET is_active = 0 WHERE id = ?")
            .bind(lab_id)
            .execute(&self.pool)
            .await
            .expect("lab deactivated");
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("valid request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("readable body")
            .to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("JSON body")
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn create_user(&self, id: &str, full_name: &str, role: &str) {
        let (status, body) = self
            .post(
                "/api/users/create",
                json!({
                    "id": id,
                    "email": format!("{id}@example.com"),
                    "fullName": full_name,
                    "role": role,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
    }

    /// Creates a lab owned by `teacher_id`, returning `(id, sessionCode)`.
    pub async fn create_lab(&self, teacher_id: &str, title: &str) -> (i64, String) {
        let (status, body) = self
            .post(
                "/api/labs",
                json!({ "userId": teacher_id, "role": "teacher", "title": title }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        (
            body["id"].as_i64().expect("lab id"),
            body["sessionCode"].as_str().expect("session code").to_string(),
        )
    }

    pub async fn join(&self, student_id: &str, session_code: &str) -> (StatusCode, Value) {
        self.post(
            "/api/labs/join",
            json!({ "userId": student_id, "role": "student", "sessionCode": session_code }),
        )
        .await
    }

    /// A teacher with one lab and one joined student. Returns `(lab_id, session_code)`.
    pub async fn classroom(&self) -> (i64, String) {
        self.create_user("teacher123", "John Teacher", "teacher").await;
        self.create_user("student456", "Alice Student", "student").await;
        let (lab_id, code) = self.create_lab("teacher123", "Intro to Python").await;
        let (status, _) = self.join("student456", &code).await;
        assert_eq!(status, StatusCode::CREATED);
        (lab_id, code)
    }
}
