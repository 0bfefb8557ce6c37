//! services/api/src/web/participants.rs

use crate::web::error::HttpResult;
use crate::web::params::{
    load_session, parse_lab_id, parse_role, query_params, require, require_member, AccessQuery,
};
use crate::web::state::AppState;
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use codelab_core::domain::ParticipantDetails;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

/// A participant decorated with the student's name and email.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantResponse {
    pub id: i64,
    pub lab_session_id: i64,
    pub student_id: String,
    pub student_name: String,
    pub student_email: String,
    pub joined_at: String,
}

impl From<ParticipantDetails> for ParticipantResponse {
    fn from(d: ParticipantDetails) -> Self {
        Self {
            id: d.participant.id,
            lab_session_id: d.participant.lab_session_id,
            student_id: d.participant.student_id,
            student_name: d.student_name,
            student_email: d.student_email,
            joined_at: d.participant.joined_at,
        }
    }
}

/// List the students who joined a lab session, in join order.
#[utoipa::path(
    get,
    path = "/api/labs/{id}/participants",
    params(
        ("id" = i64, Path, description = "Lab session id"),
        AccessQuery
    ),
    responses(
        (status = 200, description = "Participants of the lab session", body = [ParticipantResponse]),
        (status = 400, description = "Missing or invalid parameters", body = crate::web::error::ErrorBody),
        (status = 403, description = "Not the owner or a participant", body = crate::web::error::ErrorBody),
        (status = 404, description = "Lab session not found", body = crate::web::error::ErrorBody)
    ),
    tag = "participants"
)]
pub async fn list_participants_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
    query: Result<Query<AccessQuery>, QueryRejection>,
) -> HttpResult<impl IntoResponse> {
    let query = query_params(query)?;
    let user_id = require(query.user_id, "MISSING_USER_ID", "userId parameter is required")?;
    let role = require(query.role, "MISSING_ROLE", "role parameter is required")?;
    let lab_id = parse_lab_id(&id, "INVALID_ID")?;

    let session = load_session(&app_state, lab_id, "LAB_NOT_FOUND").await?;
    let role = parse_role(&role)?;
    require_member(
        &app_state,
        &session,
        &user_id,
        role,
        "Not authorized to view participants of this lab session",
    )
    .await?;

    let participants = app_state.db.list_participants(session.id).await?;
    let body: Vec<ParticipantResponse> = participants.into_iter().map(Into::into).collect();
    Ok((StatusCode::OK, Json(body)))
}
