//! services/api/src/web/users.rs

use crate::web::error::{HttpError, HttpResult};
use crate::web::params::{json_body, parse_role, present};
use crate::web::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use codelab_core::domain::{NewUser, User};
use codelab_core::ports::PortError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            full_name: u.full_name,
            role: u.role.to_string(),
            created_at: u.created_at,
        }
    }
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub id: Option<String>,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<String>,
}

/// Register an application user profile for an already-authenticated identity.
#[utoipa::path(
    post,
    path = "/api/users/create",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Missing fields, invalid role or duplicate user", body = crate::web::error::ErrorBody)
    ),
    tag = "users"
)]
pub async fn create_user_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> HttpResult<impl IntoResponse> {
    let req = json_body(payload)?;

    let (id, email, full_name, role) = match (
        present(req.id),
        present(req.email),
        present(req.full_name),
        present(req.role),
    ) {
        (Some(id), Some(email), Some(full_name), Some(role)) => (id, email, full_name, role),
        _ => {
            return Err(HttpError::bad_request(
                "MISSING_REQUIRED_FIELDS",
                "id, email, fullName and role are required",
            ))
        }
    };
    let role = parse_role(&role)?;

    let user = app_state
        .db
        .create_user(&NewUser {
            id,
            email,
            full_name,
            role,
        })
        .await
        .map_err(|e| match e {
            PortError::Conflict(_) => {
                HttpError::bad_request("DUPLICATE_USER", "A user with this id or email already exists")
            }
            other => other.into(),
        })?;
    info!("Created {} user {}", user.role, user.id);

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}
