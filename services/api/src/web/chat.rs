//! services/api/src/web/chat.rs
//!
//! Session chat. A message without a receiver is public to the whole session;
//! one with a receiver belongs to the private thread between the two users.

use crate::web::error::{HttpError, HttpResult};
use crate::web::params::{
    json_body, load_session, load_user, parse_lab_id, parse_role, present, query_params,
    require_member,
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
use codelab_core::domain::{ChatMessage, NewChatMessage, Role};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageResponse {
    pub id: i64,
    pub lab_session_id: i64,
    pub sender_id: String,
    pub sender_name: Option<String>,
    pub receiver_id: Option<String>,
    pub receiver_name: Option<String>,
    pub message: String,
    pub created_at: String,
}

impl From<ChatMessage> for ChatMessageResponse {
    fn from(m: ChatMessage) -> Self {
        Self {
            id: m.id,
            lab_session_id: m.lab_session_id,
            sender_id: m.sender_id,
            sender_name: m.sender_name,
            receiver_id: m.receiver_id,
            receiver_name: m.receiver_name,
            message: m.message,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ChatQuery {
    /// Id of the acting user.
    pub user_id: Option<String>,
    /// Either `teacher` or `student`.
    pub role: Option<String>,
    /// Other side of a private thread. Omit for the public channel.
    pub receiver_id: Option<String>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendChatRequest {
    pub user_id: Option<String>,
    pub role: Option<String>,
    pub receiver_id: Option<String>,
    pub message: Option<String>,
}

/// Read the public channel, or a private thread when `receiverId` is given.
#[utoipa::path(
    get,
    path = "/api/labs/{id}/chat",
    params(
        ("id" = i64, Path, description = "Lab session id"),
        ChatQuery
    ),
    responses(
        (status = 200, description = "Messages, oldest first", body = [ChatMessageResponse]),
        (status = 400, description = "Missing or invalid parameters", body = crate::web::error::ErrorBody),
        (status = 403, description = "Not the owner or a participant", body = crate::web::error::ErrorBody),
        (status = 404, description = "Lab session not found", body = crate::web::error::ErrorBody)
    ),
    tag = "chat"
)]
pub async fn list_messages_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
    query: Result<Query<ChatQuery>, QueryRejection>,
) -> HttpResult<impl IntoResponse> {
    let query = query_params(query)?;
    let lab_id = parse_lab_id(&id, "INVALID_LAB_ID")?;
    let (user_id, role) = match (present(query.user_id), present(query.role)) {
        (Some(user_id), Some(role)) => (user_id, role),
        _ => {
            return Err(HttpError::bad_request(
                "MISSING_REQUIRED_PARAMS",
                "userId and role are required",
            ))
        }
    };

    let session = load_session(&app_state, lab_id, "LAB_NOT_FOUND").await?;
    let role = parse_role(&role)?;
    require_member(&app_state, &session, &user_id, role, denial_message(role)).await?;

    let messages = match present(query.receiver_id) {
        Some(other_id) => {
            app_state
                .db
                .list_private_messages(session.id, &user_id, &other_id)
                .await?
        }
        None => app_state.db.list_public_messages(session.id).await?,
    };

    let body: Vec<ChatMessageResponse> = messages.into_iter().map(Into::into).collect();
    Ok((StatusCode::OK, Json(body)))
}

/// Send a chat message, publicly or to a single receiver.
#[utoipa::path(
    post,
    path = "/api/labs/{id}/chat",
    params(("id" = i64, Path, description = "Lab session id")),
    request_body = SendChatRequest,
    responses(
        (status = 201, description = "Message stored", body = ChatMessageResponse),
        (status = 400, description = "Missing or invalid fields", body = crate::web::error::ErrorBody),
        (status = 403, description = "Not the owner or a participant", body = crate::web::error::ErrorBody),
        (status = 404, description = "Lab session, sender or receiver not found", body = crate::web::error::ErrorBody)
    ),
    tag = "chat"
)]
pub async fn send_message_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<SendChatRequest>, JsonRejection>,
) -> HttpResult<impl IntoResponse> {
    let lab_id = parse_lab_id(&id, "INVALID_LAB_ID")?;
    let req = json_body(payload)?;

    let user_id = present(req.user_id)
        .ok_or_else(|| HttpError::bad_request("MISSING_USER_ID", "userId is required"))?;
    let role = present(req.role)
        .ok_or_else(|| HttpError::bad_request("MISSING_ROLE", "role is required"))?;
    let message = req
        .message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| {
            HttpError::bad_request(
                "INVALID_MESSAGE",
                "message is required and must be at least 1 character",
            )
        })?
        .to_string();

    let session = load_session(&app_state, lab_id, "LAB_NOT_FOUND").await?;
    load_user(&app_state, &user_id, "USER_NOT_FOUND", "Sender user not found").await?;

    let role = parse_role(&role)?;
    require_member(&app_state, &session, &user_id, role, send_denial_message(role)).await?;

    let receiver_id = present(req.receiver_id);
    if let Some(receiver_id) = &receiver_id {
        load_user(&app_state, receiver_id, "RECEIVER_NOT_FOUND", "Receiver user not found").await?;
    }

    let stored = app_state
        .db
        .create_chat_message(&NewChatMessage {
            lab_session_id: session.id,
            sender_id: user_id,
            receiver_id,
            message,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ChatMessageResponse::from(stored))))
}

fn denial_message(role: Role) -> &'static str {
    match role {
        Role::Teacher => "You do not have permission to view messages for this lab",
        Role::Student => "You are not a participant in this lab",
    }
}

fn send_denial_message(role: Role) -> &'static str {
    match role {
        Role::Teacher => "You do not have permission to send messages in this lab",
        Role::Student => "You are not a participant in this lab",
    }
}
