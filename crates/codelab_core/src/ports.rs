//! crates/codelab_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;

use crate::domain::{
    Announcement, ChatMessage, CodeFile, CodeFileDetails, CodeSubmission, ExecutionRequest,
    LabSession, LabSessionDetails, NewChatMessage, NewLabSession, NewUser, Participant,
    ParticipantDetails, Upserted, User,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// A uniqueness constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),
    /// The remote service answered with a non-success status.
    #[error("Upstream service returned {status}: {message}")]
    Upstream { status: u16, message: String },
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Users ---
    async fn create_user(&self, user: &NewUser) -> PortResult<User>;

    async fn get_user(&self, user_id: &str) -> PortResult<User>;

    // --- Lab Sessions ---
    async fn create_lab_session(&self, session: &NewLabSession) -> PortResult<LabSession>;

    async fn session_code_exists(&self, session_code: &str) -> PortResult<bool>;

    async fn get_lab_session(&self, lab_session_id: i64) -> PortResult<LabSession>;

    async fn get_lab_session_details(&self, lab_session_id: i64)
        -> PortResult<LabSessionDetails>;

    /// Looks a session up by its join code, ignoring case.
    async fn find_lab_session_by_code(&self, session_code: &str)
        -> PortResult<Option<LabSession>>;

    async fn list_lab_sessions_for_teacher(&self, teacher_id: &str)
        -> PortResult<Vec<LabSession>>;

    async fn list_lab_sessions_for_student(&self, student_id: &str)
        -> PortResult<Vec<LabSession>>;

    // --- Participants ---
    async fn find_participant(
        &self,
        lab_session_id: i64,
        student_id: &str,
    ) -> PortResult<Option<Participant>>;

    async fn add_participant(&self, lab_session_id: i64, student_id: &str)
        -> PortResult<Participant>;

    async fn list_participants(&self, lab_session_id: i64) -> PortResult<Vec<ParticipantDetails>>;

    // --- Announcements ---
    async fn create_announcement(
        &self,
        lab_session_id: i64,
        created_by: &str,
        message: &str,
    ) -> PortResult<Announcement>;

    /// Newest first.
    async fn list_announcements(&self, lab_session_id: i64) -> PortResult<Vec<Announcement>>;

    // --- Chat ---
    async fn create_chat_message(&self, message: &NewChatMessage) -> PortResult<ChatMessage>;

    async fn list_public_messages(&self, lab_session_id: i64) -> PortResult<Vec<ChatMessage>>;

    /// Both directions of the 1:1 thread between `user_id` and `other_id`, oldest first.
    async fn list_private_messages(
        &self,
        lab_session_id: i64,
        user_id: &str,
        other_id: &str,
    ) -> PortResult<Vec<ChatMessage>>;

    // --- Code Files ---
    /// Inserts the file, or replaces code and language of the existing file with the
    /// same (session, student, file name).
    async fn upsert_code_file(&self, submission: &CodeSubmission)
        -> PortResult<Upserted<CodeFile>>;

    /// Newest first. `student_id` narrows the listing to one student's files.
    async fn list_code_files(
        &self,
        lab_session_id: i64,
        student_id: Option<&str>,
    ) -> PortResult<Vec<CodeFile>>;

    /// Ordered by student name, then file name.
    async fn list_code_files_with_students(
        &self,
        lab_session_id: i64,
    ) -> PortResult<Vec<CodeFileDetails>>;
}

#[async_trait]
pub trait CodeExecutionService: Send + Sync {
    /// Runs the source synchronously and returns the provider's result document as-is.
    async fn execute(&self, request: &ExecutionRequest) -> PortResult<serde_json::Value>;
}
