//! services/api/src/web/router.rs
//!
//! Assembles every `/api` route onto a single axum `Router`.

use crate::web::state::AppState;
use crate::web::{announcements, chat, code, execute, labs, participants, users};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Builds the API router. CORS and the Swagger UI are layered on by the server binary.
pub fn router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/users/create", post(users::create_user_handler))
        .route(
            "/api/labs",
            get(labs::list_labs_handler).post(labs::create_lab_handler),
        )
        .route("/api/labs/join", post(labs::join_lab_handler))
        .route("/api/labs/{id}", get(labs::get_lab_handler))
        .route(
            "/api/labs/{id}/participants",
            get(participants::list_participants_handler),
        )
        .route(
            "/api/labs/{id}/announcements",
            get(announcements::list_announcements_handler)
                .post(announcements::create_announcement_handler),
        )
        .route(
            "/api/labs/{id}/chat",
            get(chat::list_messages_handler).post(chat::send_message_handler),
        )
        .route(
            "/api/labs/{id}/code",
            get(code::list_code_handler).post(code::submit_code_handler),
        )
        .route("/api/labs/{id}/all-code", get(code::list_all_code_handler))
        .route("/api/judge0/execute", post(execute::execute_handler))
        .route("/api/languages", get(execute::list_languages_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
