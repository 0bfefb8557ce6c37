//! services/api/src/web/code.rs
//!
//! Student code files: saving by file name, and the per-role listings.

use crate::web::error::{HttpError, HttpResult};
use crate::web::params::{
    json_body, load_session, parse_lab_id, parse_role, query_params, require, require_member,
    AccessQuery,
};
use crate::web::state::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json},
};
use codelab_core::access::owns_session;
use codelab_core::domain::{CodeFile, CodeFileDetails, CodeSubmission, Role};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::ToSchema;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CodeFileResponse {
    pub id: i64,
    pub lab_session_id: i64,
    pub student_id: String,
    pub file_name: String,
    pub language: String,
    pub code: String,
    pub last_updated: String,
}

impl From<CodeFile> for CodeFileResponse {
    fn from(f: CodeFile) -> Self {
        Self {
            id: f.id,
            lab_session_id: f.lab_session_id,
            student_id: f.student_id,
            file_name: f.file_name,
            language: f.language,
            code: f.code,
            last_updated: f.last_updated,
        }
    }
}

/// A code file tagged with its author, as listed for the owning teacher.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentCodeFileResponse {
    pub id: i64,
    pub lab_session_id: i64,
    pub student_id: String,
    pub student_name: Option<String>,
    pub student_email: Option<String>,
    pub file_name: String,
    pub language: String,
    pub code: String,
    pub last_updated: String,
}

impl From<CodeFileDetails> for StudentCodeFileResponse {
    fn from(d: CodeFileDetails) -> Self {
        let f = d.file;
        Self {
            id: f.id,
            lab_session_id: f.lab_session_id,
            student_id: f.student_id,
            student_name: d.student_name,
            student_email: d.student_email,
            file_name: f.file_name,
            language: f.language,
            code: f.code,
            last_updated: f.last_updated,
        }
    }
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitCodeRequest {
    pub user_id: Option<String>,
    pub role: Option<String>,
    pub file_name: Option<String>,
    pub language: Option<String>,
    pub code: Option<String>,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// List code files: every file for the owning teacher, a student's own files otherwise.
#[utoipa::path(
    get,
    path = "/api/labs/{id}/code",
    params(
        ("id" = i64, Path, description = "Lab session id"),
        AccessQuery
    ),
    responses(
        (status = 200, description = "Code files, most recently updated first", body = [CodeFileResponse]),
        (status = 400, description = "Missing or invalid parameters", body = crate::web::error::ErrorBody),
        (status = 403, description = "Not the owner or a participant", body = crate::web::error::ErrorBody),
        (status = 404, description = "Lab session not found", body = crate::web::error::ErrorBody)
    ),
    tag = "code"
)]
pub async fn list_code_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
    query: Result<Query<AccessQuery>, QueryRejection>,
) -> HttpResult<impl IntoResponse> {
    let query = query_params(query)?;
    let lab_id = parse_lab_id(&id, "INVALID_ID")?;
    let user_id = require(query.user_id, "MISSING_USER_ID", "userId is required")?;
    let role = require(query.role, "MISSING_ROLE", "role is required")?;

    let session = load_session(&app_state, lab_id, "LAB_NOT_FOUND").await?;
    let role = parse_role(&role)?;
    require_member(
        &app_state,
        &session,
        &user_id,
        role,
        "You are not authorized to view code for this lab session",
    )
    .await?;

    let student_filter = match role {
        Role::Teacher => None,
        Role::Student => Some(user_id.as_str()),
    };
    let files = app_state.db.list_code_files(session.id, student_filter).await?;

    let body: Vec<CodeFileResponse> = files.into_iter().map(Into::into).collect();
    Ok((StatusCode::OK, Json(body)))
}

/// Save a student's file. Saving under an existing file name replaces its contents.
#[utoipa::path(
    post,
    path = "/api/labs/{id}/code",
    params(("id" = i64, Path, description = "Lab session id")),
    request_body = SubmitCodeRequest,
    responses(
        (status = 200, description = "Existing file updated", body = CodeFileResponse),
        (status = 201, description = "New file created", body = CodeFileResponse),
        (status = 400, description = "Missing or invalid fields", body = crate::web::error::ErrorBody),
        (status = 403, description = "Not a participating student", body = crate::web::error::ErrorBody),
        (status = 404, description = "Lab session not found", body = crate::web::error::ErrorBody)
    ),
    tag = "code"
)]
pub async fn submit_code_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<SubmitCodeRequest>, JsonRejection>,
) -> HttpResult<impl IntoResponse> {
    let lab_id = parse_lab_id(&id, "INVALID_ID")?;
    let req = json_body(payload)?;

    let user_id = require(req.user_id, "MISSING_USER_ID", "userId is required")?;
    let role = require(req.role, "MISSING_ROLE", "role is required")?;
    let file_name = require(req.file_name, "MISSING_FILE_NAME", "fileName is required")?;
    let language = require(req.language, "MISSING_LANGUAGE", "language is required")?;
    // An empty file is a valid submission.
    let code = req
        .code
        .ok_or_else(|| HttpError::bad_request("MISSING_CODE", "code is required"))?;

    if parse_role(&role)? != Role::Student {
        return Err(HttpError::forbidden(
            "TEACHER_NOT_ALLOWED",
            "Only students can submit code",
        ));
    }

    let file_name = file_name.trim();
    if file_name.is_empty() {
        return Err(HttpError::bad_request(
            "INVALID_FILE_NAME",
            "fileName must be at least 1 character",
        ));
    }
    let language = language.trim();
    if language.is_empty() {
        return Err(HttpError::bad_request(
            "INVALID_LANGUAGE",
            "language must be at least 1 character",
        ));
    }

    let session = load_session(&app_state, lab_id, "LAB_NOT_FOUND").await?;
    if app_state.db.find_participant(session.id, &user_id).await?.is_none() {
        warn!("Student {} is not a participant of lab session {}", user_id, session.id);
        return Err(HttpError::forbidden(
            "NOT_PARTICIPANT",
            "Student is not a participant in this lab",
        ));
    }

    let saved = app_state
        .db
        .upsert_code_file(&CodeSubmission {
            lab_session_id: session.id,
            student_id: user_id,
            file_name: file_name.to_string(),
            language: language.to_string(),
            code,
        })
        .await?;

    let status = if saved.was_created() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    let file = saved.into_inner();
    info!(
        "Saved {} for student {} in lab session {}",
        file.file_name, file.student_id, file.lab_session_id
    );
    Ok((status, Json(CodeFileResponse::from(file))))
}

/// List every student's files for the owning teacher, tagged with student details.
#[utoipa::path(
    get,
    path = "/api/labs/{id}/all-code",
    params(
        ("id" = i64, Path, description = "Lab session id"),
        AccessQuery
    ),
    responses(
        (status = 200, description = "All code files, by student name then file name", body = [StudentCodeFileResponse]),
        (status = 400, description = "Missing or invalid parameters", body = crate::web::error::ErrorBody),
        (status = 403, description = "Not the owning teacher", body = crate::web::error::ErrorBody),
        (status = 404, description = "Lab session not found", body = crate::web::error::ErrorBody)
    ),
    tag = "code"
)]
pub async fn list_all_code_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
    query: Result<Query<AccessQuery>, QueryRejection>,
) -> HttpResult<impl IntoResponse> {
    let query = query_params(query)?;
    let lab_id = parse_lab_id(&id, "INVALID_LAB_SESSION_ID")?;
    let user_id = require(query.user_id, "MISSING_USER_ID", "userId parameter is required")?;
    let role = require(query.role, "MISSING_ROLE", "role parameter is required")?;

    if parse_role(&role)? != Role::Teacher {
        return Err(HttpError::forbidden(
            "FORBIDDEN_NOT_TEACHER",
            "Only teachers can access all students code",
        ));
    }

    let session = load_session(&app_state, lab_id, "LAB_SESSION_NOT_FOUND").await?;
    if !owns_session(&session, &user_id) {
        warn!("Teacher {} does not own lab session {}", user_id, session.id);
        return Err(HttpError::forbidden(
            "FORBIDDEN_NOT_OWNER",
            "You are not authorized to view code for this lab session",
        ));
    }

    let files = app_state.db.list_code_files_with_students(session.id).await?;
    let body: Vec<StudentCodeFileResponse> = files.into_iter().map(Into::into).collect();
    Ok((StatusCode::OK, Json(body)))
}
