//! Code file submission and listing, including the full classroom flow.

mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn saving_the_same_file_twice_updates_it() {
    let app = TestApp::new().await;
    let (lab_id, _) = app.classroom().await;
    let uri = format!("/api/labs/{lab_id}/code");

    let (status, first) = app
        .post(
            &uri,
            json!({ "userId": "student456", "role": "student", "fileName": "main.py", "language": "python", "code": "print(1)" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, second) = app
        .post(
            &uri,
            json!({ "userId": "student456", "role": "student", "fileName": " main.py ", "language": "python", "code": "print(2)" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["id"], first["id"]);
    assert_eq!(second["code"], "print(2)");

    let (status, body) = app.get(&format!("{uri}?userId=student456&role=student")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["code"], "print(2)");
}

#[tokio::test]
async fn empty_files_are_accepted() {
    let app = TestApp::new().await;
    let (lab_id, _) = app.classroom().await;

    let (status, body) = app
        .post(
            &format!("/api/labs/{lab_id}/code"),
            json!({ "userId": "student456", "role": "student", "fileName": "empty.js", "language": "javascript", "code": "" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["code"], "");
}

#[tokio::test]
async fn submissions_require_a_participating_student() {
    let app = TestApp::new().await;
    let (lab_id, _) = app.classroom().await;
    app.create_user("student789", "Bob Learner", "student").await;
    let uri = format!("/api/labs/{lab_id}/code");

    let (status, body) = app
        .post(
            &uri,
            json!({ "userId": "teacher123", "role": "teacher", "fileName": "a.py", "language": "python", "code": "" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "TEACHER_NOT_ALLOWED");

    let (status, body) = app
        .post(
            &uri,
            json!({ "userId": "student789", "role": "student", "fileName": "a.py", "language": "python", "code": "" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "NOT_PARTICIPANT");

    let (status, body) = app
        .post(
            &uri,
            json!({ "userId": "student456", "role": "student", "fileName": "   ", "language": "python", "code": "" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_FILE_NAME");

    let (status, body) = app
        .post(
            &uri,
            json!({ "userId": "student456", "role": "student", "fileName": "a.py", "language": "python" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MISSING_CODE");
}

#[tokio::test]
async fn students_only_see_their_own_files() {
    let app = TestApp::new().await;
    let (lab_id, code) = app.classroom().await;
    app.create_user("student789", "Bob Learner", "student").await;
    assert_eq!(app.join("student789", &code).await.0, StatusCode::CREATED);
    let uri = format!("/api/labs/{lab_id}/code");

    for student in ["student456", "student789"] {
        let (status, _) = app
            .post(
                &uri,
                json!({ "userId": student, "role": "student", "fileName": "main.py", "language": "python", "code": student }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, mine) = app.get(&format!("{uri}?userId=student789&role=student")).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);
    assert_eq!(mine[0]["studentId"], "student789");

    let (_, all) = app.get(&format!("{uri}?userId=teacher123&role=teacher")).await;
    assert_eq!(all.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn full_classroom_flow_reaches_the_teacher() {
    let app = TestApp::new().await;
    app.create_user("teacher123", "John Teacher", "teacher").await;
    app.create_user("student456", "Alice Student", "student").await;
    app.create_user("student789", "Bob Learner", "student").await;
    let (lab_id, code) = app.create_lab("teacher123", "Intro to Python").await;

    for student in ["student789", "student456"] {
        assert_eq!(app.join(student, &code).await.0, StatusCode::CREATED);
        let (status, _) = app
            .post(
                &format!("/api/labs/{lab_id}/code"),
                json!({ "userId": student, "role": "student", "fileName": "main.py", "language": "python", "code": "print('hi')" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = app
        .get(&format!("/api/labs/{lab_id}/all-code?userId=teacher123&role=teacher"))
        .await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["studentName"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["Alice Student", "Bob Learner"]);
    assert_eq!(body[0]["studentEmail"], "student456@example.com");
}

#[tokio::test]
async fn all_code_is_for_the_owning_teacher_only() {
    let app = TestApp::new().await;
    let (lab_id, _) = app.classroom().await;
    app.create_user("teacher456", "Jane Instructor", "teacher").await;
    let uri = format!("/api/labs/{lab_id}/all-code");

    let (status, body) = app.get(&format!("{uri}?userId=teacher456&role=teacher")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN_NOT_OWNER");

    let (status, body) = app.get(&format!("{uri}?userId=student456&role=student")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN_NOT_TEACHER");

    let (status, body) = app.get("/api/labs/999/all-code?userId=teacher123&role=teacher").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "LAB_SESSION_NOT_FOUND");
}
