//! services/api/src/web/announcements.rs
//!
//! Teacher-to-class broadcasts within a lab session.

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
use codelab_core::domain::{Announcement, Role};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementResponse {
    pub id: i64,
    pub lab_session_id: i64,
    pub message: String,
    pub created_by: String,
    pub creator_name: Option<String>,
    pub created_at: String,
}

impl From<Announcement> for AnnouncementResponse {
    fn from(a: Announcement) -> Self {
        Self {
            id: a.id,
            lab_session_id: a.lab_session_id,
            message: a.message,
            created_by: a.created_by,
            creator_name: a.creator_name,
            created_at: a.created_at,
        }
    }
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnnouncementRequest {
    pub user_id: Option<String>,
    pub role: Option<String>,
    pub message: Option<String>,
}

/// List a lab session's announcements, newest first.
#[utoipa::path(
    get,
    path = "/api/labs/{id}/announcements",
    params(
        ("id" = i64, Path, description = "Lab session id"),
        AccessQuery
    ),
    responses(
        (status = 200, description = "Announcements of the lab session", body = [AnnouncementResponse]),
        (status = 400, description = "Missing or invalid parameters", body = crate::web::error::ErrorBody),
        (status = 403, description = "Not the owner or a participant", body = crate::web::error::ErrorBody),
        (status = 404, description = "Lab session not found", body = crate::web::error::ErrorBody)
    ),
    tag = "announcements"
)]
pub async fn list_announcements_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
    query: Result<Query<AccessQuery>, QueryRejection>,
) -> HttpResult<impl IntoResponse> {
    let query = query_params(query)?;
    let lab_id = parse_lab_id(&id, "INVALID_ID")?;
    let user_id = require(query.user_id, "MISSING_USER_ID", "userId parameter is required")?;
    let role = require(query.role, "MISSING_ROLE", "role parameter is required")?;

    let session = load_session(&app_state, lab_id, "LAB_NOT_FOUND").await?;
    let role = parse_role(&role)?;
    let denied = match role {
        Role::Teacher => "You are not authorized to view announcements for this lab",
        Role::Student => "You are not a participant of this lab",
    };
    require_member(&app_state, &session, &user_id, role, denied).await?;

    let announcements = app_state.db.list_announcements(session.id).await?;
    let body: Vec<AnnouncementResponse> = announcements.into_iter().map(Into::into).collect();
    Ok((StatusCode::OK, Json(body)))
}

/// Post an announcement to every participant of a lab session.
#[utoipa::path(
    post,
    path = "/api/labs/{id}/announcements",
    params(("id" = i64, Path, description = "Lab session id")),
    request_body = CreateAnnouncementRequest,
    responses(
        (status = 201, description = "Announcement created", body = AnnouncementResponse),
        (status = 400, description = "Missing or invalid fields", body = crate::web::error::ErrorBody),
        (status = 403, description = "Only the owning teacher may announce", body = crate::web::error::ErrorBody),
        (status = 404, description = "Lab session not found", body = crate::web::error::ErrorBody)
    ),
    tag = "announcements"
)]
pub async fn create_announcement_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<CreateAnnouncementRequest>, JsonRejection>,
) -> HttpResult<impl IntoResponse> {
    let lab_id = parse_lab_id(&id, "INVALID_ID")?;
    let req = json_body(payload)?;

    let user_id = require(req.user_id, "MISSING_USER_ID", "userId is required")?;
    let role = require(req.role, "MISSING_ROLE", "role is required")?;
    let message = require(req.message, "MISSING_MESSAGE", "message is required")?;
    let message = message.trim();
    if message.is_empty() {
        return Err(HttpError::bad_request(
            "INVALID_MESSAGE",
            "message must be at least 1 character",
        ));
    }

    if parse_role(&role)? != Role::Teacher {
        return Err(HttpError::forbidden(
            "FORBIDDEN_ROLE",
            "Only teachers can create announcements",
        ));
    }

    let session = load_session(&app_state, lab_id, "LAB_NOT_FOUND").await?;
    if !owns_session(&session, &user_id) {
        warn!("Teacher {} tried to announce in lab session {}", user_id, session.id);
        return Err(HttpError::forbidden(
            "FORBIDDEN",
            "You are not authorized to create announcements for this lab",
        ));
    }

    let announcement = app_state
        .db
        .create_announcement(session.id, &user_id, message)
        .await?;
    info!("Announcement {} posted to lab session {}", announcement.id, session.id);

    Ok((StatusCode::CREATED, Json(AnnouncementResponse::from(announcement))))
}
