//! services/api/src/web/params.rs
//!
//! Parameter parsing and the validation steps shared by the lab handlers.

use crate::web::error::{HttpError, HttpResult};
use crate::web::state::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query,
    },
    Json,
};
use codelab_core::access::is_session_member;
use codelab_core::domain::{LabSession, Role, User};
use codelab_core::ports::PortError;
use serde::Deserialize;
use tracing::warn;
use utoipa::IntoParams;

/// The `userId`/`role` pair every session-scoped GET carries in its query string.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AccessQuery {
    /// Id of the acting user.
    pub user_id: Option<String>,
    /// Either `teacher` or `student`.
    pub role: Option<String>,
}

/// Treats absent and empty values alike.
pub fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Returns the value or a 400 with `code` when it is absent or empty.
pub fn require(value: Option<String>, code: &'static str, message: &str) -> HttpResult<String> {
    present(value).ok_or_else(|| HttpError::bad_request(code, message))
}

pub fn parse_role(raw: &str) -> HttpResult<Role> {
    raw.parse::<Role>()
        .map_err(|_| HttpError::bad_request("INVALID_ROLE", "Invalid role specified"))
}

/// Parses the `{id}` path segment of a lab route.
pub fn parse_lab_id(raw: &str, code: &'static str) -> HttpResult<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| HttpError::bad_request(code, "Valid lab session ID is required"))
}

/// Unwraps a JSON body, turning malformed payloads into a 400.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> HttpResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| HttpError::bad_request("INVALID_JSON", e.body_text()))
}

/// Unwraps a query string, turning malformed or repeated parameters into a 400.
pub fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> HttpResult<T> {
    query
        .map(|Query(params)| params)
        .map_err(|e| HttpError::bad_request("INVALID_QUERY", e.body_text()))
}

/// Loads a session, answering 404 with `code` when it does not exist.
pub async fn load_session(
    state: &AppState,
    lab_session_id: i64,
    code: &'static str,
) -> HttpResult<LabSession> {
    match state.db.get_lab_session(lab_session_id).await {
        Ok(session) => Ok(session),
        Err(PortError::NotFound(_)) => Err(HttpError::not_found(code, "Lab session not found")),
        Err(e) => Err(e.into()),
    }
}

/// Loads a user, answering 404 with `code` when it does not exist.
pub async fn load_user(
    state: &AppState,
    user_id: &str,
    code: &'static str,
    message: &str,
) -> HttpResult<User> {
    match state.db.get_user(user_id).await {
        Ok(user) => Ok(user),
        Err(PortError::NotFound(_)) => Err(HttpError::not_found(code, message)),
        Err(e) => Err(e.into()),
    }
}

/// Enforces the membership rule: teachers must own the session, students must have joined it.
pub async fn require_member(
    state: &AppState,
    session: &LabSession,
    user_id: &str,
    role: Role,
    message: &str,
) -> HttpResult<()> {
    if is_session_member(state.db.as_ref(), session, user_id, role).await? {
        return Ok(());
    }
    warn!(
        "Denied {} {} access to lab session {}",
        role, user_id, session.id
    );
    Err(HttpError::forbidden("FORBIDDEN", message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn empty_values_count_as_missing() {
        assert_eq!(present(Some(String::new())), None);
        assert_eq!(present(Some("u1".into())), Some("u1".into()));

        let err = require(Some(String::new()), "MISSING_USER_ID", "userId is required").unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, "MISSING_USER_ID");
    }

    #[test]
    fn lab_ids_must_be_integers() {
        assert_eq!(parse_lab_id("42", "INVALID_ID").unwrap(), 42);
        let err = parse_lab_id("abc", "INVALID_LAB_ID").unwrap_err();
        assert_eq!(err.code, "INVALID_LAB_ID");
    }

    #[test]
    fn unknown_roles_are_bad_requests() {
        assert_eq!(parse_role("student").unwrap(), Role::Student);
        let err = parse_role("admin").unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, "INVALID_ROLE");
    }
}
