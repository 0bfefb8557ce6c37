//! crates/codelab_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{SecondsFormat, Utc};
use std::fmt;
use std::str::FromStr;

/// Returns the current UTC time as an ISO-8601 string with millisecond precision,
/// the format every lab table stores its timestamps in.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

//=========================================================================================
// Users and Roles
//=========================================================================================

/// The two kinds of account the lab knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Teacher,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Teacher => "teacher",
            Role::Student => "student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a role string is neither `teacher` nor `student`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "teacher" => Ok(Role::Teacher),
            "student" => Ok(Role::Student),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// A registered user. The id is issued by the external auth provider.
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub role: Role,
}

//=========================================================================================
// Lab Sessions and Participants
//=========================================================================================

/// A lab session owned by a teacher and joined by students through its code.
#[derive(Debug, Clone)]
pub struct LabSession {
    pub id: i64,
    pub session_code: String,
    pub title: String,
    pub description: Option<String>,
    pub teacher_id: String,
    pub is_active: bool,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewLabSession {
    pub session_code: String,
    pub title: String,
    pub description: Option<String>,
    pub teacher_id: String,
}

/// A session together with the owning teacher's display name.
#[derive(Debug, Clone)]
pub struct LabSessionDetails {
    pub session: LabSession,
    pub teacher_name: Option<String>,
}

/// Records that a student has joined a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: i64,
    pub lab_session_id: i64,
    pub student_id: String,
    pub joined_at: String,
}

#[derive(Debug, Clone)]
pub struct ParticipantDetails {
    pub participant: Participant,
    pub student_name: String,
    pub student_email: String,
}

//=========================================================================================
// Announcements and Chat
//=========================================================================================

#[derive(Debug, Clone)]
pub struct Announcement {
    pub id: i64,
    pub lab_session_id: i64,
    pub message: String,
    pub created_by: String,
    pub creator_name: Option<String>,
    pub created_at: String,
}

/// A chat line. `receiver_id == None` marks a public, session-wide message.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub id: i64,
    pub lab_session_id: i64,
    pub sender_id: String,
    pub sender_name: Option<String>,
    pub receiver_id: Option<String>,
    pub receiver_name: Option<String>,
    pub message: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewChatMessage {
    pub lab_session_id: i64,
    pub sender_id: String,
    pub receiver_id: Option<String>,
    pub message: String,
}

//=========================================================================================
// Code Files
//=========================================================================================

/// One source file a student keeps in a session, unique by file name.
#[derive(Debug, Clone)]
pub struct CodeFile {
    pub id: i64,
    pub lab_session_id: i64,
    pub student_id: String,
    pub file_name: String,
    pub language: String,
    pub code: String,
    pub last_updated: String,
}

#[derive(Debug, Clone)]
pub struct CodeSubmission {
    pub lab_session_id: i64,
    pub student_id: String,
    pub file_name: String,
    pub language: String,
    pub code: String,
}

#[derive(Debug, Clone)]
pub struct CodeFileDetails {
    pub file: CodeFile,
    pub student_name: Option<String>,
    pub student_email: Option<String>,
}

/// The outcome of an insert-or-update.
#[derive(Debug, Clone)]
pub enum Upserted<T> {
    Created(T),
    Updated(T),
}

impl<T> Upserted<T> {
    pub fn was_created(&self) -> bool {
        matches!(self, Upserted::Created(_))
    }

    pub fn into_inner(self) -> T {
        match self {
            Upserted::Created(value) | Upserted::Updated(value) => value,
        }
    }
}

//=========================================================================================
// Code Execution
//=========================================================================================

/// A single synchronous run request for the external execution provider.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub source_code: String,
    pub language_id: i64,
    pub stdin: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_only_known_values() {
        assert_eq!("teacher".parse::<Role>(), Ok(Role::Teacher));
        assert_eq!("student".parse::<Role>(), Ok(Role::Student));
        assert_eq!(
            "Teacher".parse::<Role>(),
            Err(UnknownRole("Teacher".to_string()))
        );
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn timestamps_are_iso8601_with_millis() {
        let ts = timestamp_now();
        assert!(ts.ends_with('Z'));
        assert_eq!(ts.len(), "2024-12-20T00:00:00.000Z".len());
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }

    #[test]
    fn upserted_reports_creation() {
        let created = Upserted::Created(1);
        let updated = Upserted::Updated(2);
        assert!(created.was_created());
        assert!(!updated.was_created());
        assert_eq!(updated.into_inner(), 2);
    }
}
