//! services/api/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification of the REST API.

use crate::web::{announcements, chat, code, error, execute, labs, participants, users};
use utoipa::OpenApi;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        users::create_user_handler,
        labs::list_labs_handler,
        labs::create_lab_handler,
        labs::get_lab_handler,
        labs::join_lab_handler,
        participants::list_participants_handler,
        announcements::list_announcements_handler,
        announcements::create_announcement_handler,
        chat::list_messages_handler,
        chat::send_message_handler,
        code::list_code_handler,
        code::submit_code_handler,
        code::list_all_code_handler,
        execute::execute_handler,
        execute::list_languages_handler,
    ),
    components(
        schemas(
            error::ErrorBody,
            users::CreateUserRequest,
            users::UserResponse,
            labs::CreateLabRequest,
            labs::JoinLabRequest,
            labs::LabSessionResponse,
            labs::LabSessionDetailsResponse,
            labs::JoinLabResponse,
            participants::ParticipantResponse,
            announcements::CreateAnnouncementRequest,
            announcements::AnnouncementResponse,
            chat::SendChatRequest,
            chat::ChatMessageResponse,
            code::SubmitCodeRequest,
            code::CodeFileResponse,
            code::StudentCodeFileResponse,
            execute::ExecuteRequest,
            execute::LanguageResponse,
        )
    ),
    tags(
        (name = "users", description = "Application user profiles."),
        (name = "labs", description = "Lab sessions and joining by session code."),
        (name = "participants", description = "Students enrolled in a lab session."),
        (name = "announcements", description = "Teacher broadcasts to a lab session."),
        (name = "chat", description = "Public and private chat within a lab session."),
        (name = "code", description = "Student code files."),
        (name = "execution", description = "Remote code execution and the language catalog.")
    )
)]
pub struct ApiDoc;
