//! services/api/src/web/labs.rs
//!
//! Handlers for creating, listing, viewing and joining lab sessions.

use crate::web::error::{HttpError, HttpResult};
use crate::web::params::{
    json_body, load_user, parse_lab_id, parse_role, present, query_params, require,
    require_member, AccessQuery,
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
use codelab_core::domain::{LabSession, LabSessionDetails, NewLabSession, Participant, Role};
use codelab_core::ports::PortError;
use codelab_core::session_code::{generate_unique_session_code, has_valid_length};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LabSessionResponse {
    pub id: i64,
    pub session_code: String,
    pub title: String,
    pub description: Option<String>,
    pub teacher_id: String,
    pub is_active: bool,
    pub created_at: String,
}

impl From<LabSession> for LabSessionResponse {
    fn from(s: LabSession) -> Self {
        Self {
            id: s.id,
            session_code: s.session_code,
            title: s.title,
            description: s.description,
            teacher_id: s.teacher_id,
            is_active: s.is_active,
            created_at: s.created_at,
        }
    }
}

/// A session as shown on its detail page, with the teacher's display name.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LabSessionDetailsResponse {
    pub id: i64,
    pub session_code: String,
    pub title: String,
    pub description: Option<String>,
    pub teacher_id: String,
    pub teacher_name: Option<String>,
    pub is_active: bool,
    pub created_at: String,
}

impl From<LabSessionDetails> for LabSessionDetailsResponse {
    fn from(d: LabSessionDetails) -> Self {
        let s = d.session;
        Self {
            id: s.id,
            session_code: s.session_code,
            title: s.title,
            description: s.description,
            teacher_id: s.teacher_id,
            teacher_name: d.teacher_name,
            is_active: s.is_active,
            created_at: s.created_at,
        }
    }
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLabRequest {
    pub user_id: Option<String>,
    pub role: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinLabRequest {
    pub user_id: Option<String>,
    pub role: Option<String>,
    pub session_code: Option<String>,
}

/// The participant record of a join, together with the joined session.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinLabResponse {
    pub id: i64,
    pub lab_session_id: i64,
    pub student_id: String,
    pub joined_at: String,
    pub lab_session: LabSessionResponse,
}

impl JoinLabResponse {
    fn new(participant: Participant, session: LabSession) -> Self {
        Self {
            id: participant.id,
            lab_session_id: participant.lab_session_id,
            student_id: participant.student_id,
            joined_at: participant.joined_at,
            lab_session: session.into(),
        }
    }
}

const MIN_TITLE_LEN: usize = 3;

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// List the lab sessions a user owns (teacher) or has joined (student).
#[utoipa::path(
    get,
    path = "/api/labs",
    params(AccessQuery),
    responses(
        (status = 200, description = "Lab sessions visible to the user", body = [LabSessionResponse]),
        (status = 400, description = "Missing or invalid parameters", body = crate::web::error::ErrorBody),
        (status = 500, description = "Internal server error", body = crate::web::error::ErrorBody)
    ),
    tag = "labs"
)]
pub async fn list_labs_handler(
    State(app_state): State<Arc<AppState>>,
    query: Result<Query<AccessQuery>, QueryRejection>,
) -> HttpResult<impl IntoResponse> {
    let query = query_params(query)?;
    let user_id = require(query.user_id, "MISSING_USER_ID", "userId parameter is required")?;
    let role = require(query.role, "MISSING_ROLE", "role parameter is required")?;
    let role = role.parse::<Role>().map_err(|_| {
        HttpError::bad_request("INVALID_ROLE", "role must be either \"teacher\" or \"student\"")
    })?;

    let labs = match role {
        Role::Teacher => app_state.db.list_lab_sessions_for_teacher(&user_id).await?,
        Role::Student => app_state.db.list_lab_sessions_for_student(&user_id).await?,
    };

    let body: Vec<LabSessionResponse> = labs.into_iter().map(Into::into).collect();
    Ok((StatusCode::OK, Json(body)))
}

/// Create a new lab session with a freshly generated join code.
#[utoipa::path(
    post,
    path = "/api/labs",
    request_body = CreateLabRequest,
    responses(
        (status = 201, description = "Lab session created", body = LabSessionResponse),
        (status = 400, description = "Missing or invalid fields", body = crate::web::error::ErrorBody),
        (status = 403, description = "Only teachers can create lab sessions", body = crate::web::error::ErrorBody),
        (status = 404, description = "Teacher not found", body = crate::web::error::ErrorBody),
        (status = 500, description = "Internal server error", body = crate::web::error::ErrorBody)
    ),
    tag = "labs"
)]
pub async fn create_lab_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<CreateLabRequest>, JsonRejection>,
) -> HttpResult<impl IntoResponse> {
    let req = json_body(payload)?;

    let user_id = require(req.user_id, "MISSING_USER_ID", "userId is required")?;
    let role = parse_role(&require(req.role, "MISSING_ROLE", "role is required")?)?;
    if role != Role::Teacher {
        return Err(HttpError::forbidden(
            "FORBIDDEN_NOT_TEACHER",
            "Only teachers can create lab sessions",
        ));
    }

    let title = require(req.title, "MISSING_TITLE", "title is required")?;
    let title = title.trim();
    if title.chars().count() < MIN_TITLE_LEN {
        return Err(HttpError::bad_request(
            "INVALID_TITLE",
            "title must be at least 3 characters long",
        ));
    }
    let description = present(req.description.map(|d| d.trim().to_string()));

    load_user(&app_state, &user_id, "USER_NOT_FOUND", "Teacher user not found").await?;

    let session_code = generate_unique_session_code(app_state.db.as_ref())
        .await?
        .ok_or_else(|| {
            error!("Exhausted attempts to generate a unique session code");
            HttpError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "SESSION_CODE_GENERATION_FAILED",
                "Failed to generate unique session code",
            )
        })?;

    let new_session = NewLabSession {
        session_code,
        title: title.to_string(),
        description,
        teacher_id: user_id,
    };

    let session = match app_state.db.create_lab_session(&new_session).await {
        Ok(session) => session,
        Err(PortError::Conflict(_)) => {
            return Err(HttpError::bad_request(
                "DUPLICATE_SESSION_CODE",
                "Session code already exists. Please try again.",
            ))
        }
        Err(e) => return Err(e.into()),
    };

    info!(
        "Teacher {} created lab session {} ({})",
        session.teacher_id, session.id, session.session_code
    );
    Ok((StatusCode::CREATED, Json(LabSessionResponse::from(session))))
}

/// View one lab session, including the teacher's name.
#[utoipa::path(
    get,
    path = "/api/labs/{id}",
    params(
        ("id" = i64, Path, description = "Lab session id"),
        AccessQuery
    ),
    responses(
        (status = 200, description = "The lab session", body = LabSessionDetailsResponse),
        (status = 400, description = "Missing or invalid parameters", body = crate::web::error::ErrorBody),
        (status = 403, description = "Not the owner or a participant", body = crate::web::error::ErrorBody),
        (status = 404, description = "Lab session not found", body = crate::web::error::ErrorBody)
    ),
    tag = "labs"
)]
pub async fn get_lab_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
    query: Result<Query<AccessQuery>, QueryRejection>,
) -> HttpResult<impl IntoResponse> {
    let query = query_params(query)?;
    let lab_id = parse_lab_id(&id, "INVALID_ID")?;
    let user_id = require(query.user_id, "MISSING_USER_ID", "userId parameter is required")?;
    let role = require(query.role, "MISSING_ROLE", "role parameter is required")?;

    let details = match app_state.db.get_lab_session_details(lab_id).await {
        Ok(details) => details,
        Err(PortError::NotFound(_)) => {
            return Err(HttpError::not_found("LAB_NOT_FOUND", "Lab session not found"))
        }
        Err(e) => return Err(e.into()),
    };

    let role = parse_role(&role)?;
    require_member(
        &app_state,
        &details.session,
        &user_id,
        role,
        "You are not authorized to view this lab session",
    )
    .await?;

    Ok((StatusCode::OK, Json(LabSessionDetailsResponse::from(details))))
}

/// Join a lab session by its code. Joining again returns the existing record.
#[utoipa::path(
    post,
    path = "/api/labs/join",
    request_body = JoinLabRequest,
    responses(
        (status = 200, description = "Already a participant", body = JoinLabResponse),
        (status = 201, description = "Joined the lab session", body = JoinLabResponse),
        (status = 400, description = "Missing or invalid fields", body = crate::web::error::ErrorBody),
        (status = 403, description = "Only students can join", body = crate::web::error::ErrorBody),
        (status = 404, description = "Lab session not found or inactive", body = crate::web::error::ErrorBody)
    ),
    tag = "labs"
)]
pub async fn join_lab_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<JoinLabRequest>, JsonRejection>,
) -> HttpResult<impl IntoResponse> {
    let req = json_body(payload)?;

    let user_id = require(req.user_id, "MISSING_USER_ID", "User ID is required")?;
    let role = require(req.role, "MISSING_ROLE", "Role is required")?;
    let session_code = require(req.session_code, "MISSING_SESSION_CODE", "Session code is required")?;

    if parse_role(&role)? != Role::Student {
        return Err(HttpError::forbidden(
            "FORBIDDEN_NOT_STUDENT",
            "Only students can join lab sessions",
        ));
    }

    if !has_valid_length(&session_code) {
        return Err(HttpError::bad_request(
            "INVALID_SESSION_CODE_LENGTH",
            "Session code must be 6 characters",
        ));
    }

    let session = app_state
        .db
        .find_lab_session_by_code(&session_code)
        .await?
        .ok_or_else(|| HttpError::not_found("SESSION_NOT_FOUND", "Lab session not found"))?;

    if !session.is_active {
        return Err(HttpError::not_found(
            "SESSION_NOT_ACTIVE",
            "Lab session is not active",
        ));
    }

    if let Some(existing) = app_state.db.find_participant(session.id, &user_id).await? {
        return Ok((StatusCode::OK, Json(JoinLabResponse::new(existing, session))));
    }

    load_user(&app_state, &user_id, "USER_NOT_FOUND", "Student user not found").await?;

    match app_state.db.add_participant(session.id, &user_id).await {
        Ok(participant) => {
            info!("Student {} joined lab session {}", user_id, session.id);
            Ok((StatusCode::CREATED, Json(JoinLabResponse::new(participant, session))))
        }
        // A concurrent join for the same student won the insert.
        Err(PortError::Conflict(_)) => {
            let existing = app_state
                .db
                .find_participant(session.id, &user_id)
                .await?
                .ok_or_else(|| HttpError::internal("participant vanished after conflict"))?;
            Ok((StatusCode::OK, Json(JoinLabResponse::new(existing, session))))
        }
        Err(e) => Err(e.into()),
    }
}
