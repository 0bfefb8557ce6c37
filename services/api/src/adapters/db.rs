//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the SQLite database using `sqlx`.

use async_trait::async_trait;
use codelab_core::domain::{
    timestamp_now, Announcement, ChatMessage, CodeFile, CodeFileDetails, CodeSubmission,
    LabSession, LabSessionDetails, NewChatMessage, NewLabSession, NewUser, Participant,
    ParticipantDetails, Upserted, User,
};
use codelab_core::ports::{DatabaseService, PortError, PortResult};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, SqlitePool};
use std::str::FromStr;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: SqlitePool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens a pool for `database_url`, creating the database file when missing.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        Ok(Self::new(pool))
    }

    /// Opens a private in-memory database with the schema applied.
    ///
    /// Every SQLite connection to `:memory:` sees its own database, so the pool is
    /// pinned to a single connection that is never recycled.
    pub async fn in_memory() -> Result<Self, crate::error::ApiError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        let adapter = Self::new(pool);
        adapter.run_migrations().await?;
        Ok(adapter)
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    /// Exposes the pool for maintenance work outside the `DatabaseService` port.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Overwrites the file keyed by session, student and file name, if it exists.
    async fn update_code_file(
        &self,
        submission: &CodeSubmission,
        last_updated: &str,
    ) -> PortResult<Option<CodeFileRecord>> {
        let sql = format!(
            "UPDATE lab_codes SET code = ?, language = ?, last_updated = ? \
             WHERE lab_session_id = ? AND student_id = ? AND file_name = ? RETURNING {}",
            CODE_FILE_COLUMNS
        );
        sqlx::query_as::<_, CodeFileRecord>(&sql)
            .bind(&submission.code)
            .bind(&submission.language)
            .bind(last_updated)
            .bind(submission.lab_session_id)
            .bind(&submission.student_id)
            .bind(&submission.file_name)
            .fetch_optional(&self.pool)
            .await
            .map_err(write_error)
    }

    async fn insert_code_file(
        &self,
        submission: &CodeSubmission,
        last_updated: &str,
    ) -> PortResult<CodeFileRecord> {
        let sql = format!(
            "INSERT INTO lab_codes (lab_session_id, student_id, file_name, language, code, last_updated) \
             VALUES (?, ?, ?, ?, ?, ?) RETURNING {}",
            CODE_FILE_COLUMNS
        );
        sqlx::query_as::<_, CodeFileRecord>(&sql)
            .bind(submission.lab_session_id)
            .bind(&submission.student_id)
            .bind(&submission.file_name)
            .bind(&submission.language)
            .bind(&submission.code)
            .bind(last_updated)
            .fetch_one(&self.pool)
            .await
            .map_err(write_error)
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

/// Maps write failures, surfacing unique-constraint violations as conflicts.
fn write_error(e: sqlx::Error) -> PortError {
    match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            PortError::Conflict(db_err.message().to_string())
        }
        _ => unexpected(e),
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: String,
    email: String,
    full_name: String,
    role: String,
    created_at: String,
}
impl UserRecord {
    fn to_domain(self) -> PortResult<User> {
        let role = self
            .role
            .parse()
            .map_err(|e| PortError::Unexpected(format!("user {}: {}", self.id, e)))?;
        Ok(User {
            id: self.id,
            email: self.email,
            full_name: self.full_name,
            role,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct LabSessionRecord {
    id: i64,
    session_code: String,
    title: String,
    description: Option<String>,
    teacher_id: String,
    is_active: bool,
    created_at: String,
}
impl LabSessionRecord {
    fn to_domain(self) -> LabSession {
        LabSession {
            id: self.id,
            session_code: self.session_code,
            title: self.title,
            description: self.description,
            teacher_id: self.teacher_id,
            is_active: self.is_active,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct LabSessionDetailsRecord {
    id: i64,
    session_code: String,
    title: String,
    description: Option<String>,
    teacher_id: String,
    teacher_name: Option<String>,
    is_active: bool,
    created_at: String,
}
impl LabSessionDetailsRecord {
    fn to_domain(self) -> LabSessionDetails {
        LabSessionDetails {
            session: LabSession {
                id: self.id,
                session_code: self.session_code,
                title: self.title,
                description: self.description,
                teacher_id: self.teacher_id,
                is_active: self.is_active,
                created_at: self.created_at,
            },
            teacher_name: self.teacher_name,
        }
    }
}

#[derive(FromRow)]
struct ParticipantRecord {
    id: i64,
    lab_session_id: i64,
    student_id: String,
    joined_at: String,
}
impl ParticipantRecord {
    fn to_domain(self) -> Participant {
        Participant {
            id: self.id,
            lab_session_id: self.lab_session_id,
            student_id: self.student_id,
            joined_at: self.joined_at,
        }
    }
}

#[derive(FromRow)]
struct ParticipantDetailsRecord {
    id: i64,
    lab_session_id: i64,
    student_id: String,
    student_name: String,
    student_email: String,
    joined_at: String,
}
impl ParticipantDetailsRecord {
    fn to_domain(self) -> ParticipantDetails {
        ParticipantDetails {
            participant: Participant {
                id: self.id,
                lab_session_id: self.lab_session_id,
                student_id: self.student_id,
                joined_at: self.joined_at,
            },
            student_name: self.student_name,
            student_email: self.student_email,
        }
    }
}

#[derive(FromRow)]
struct AnnouncementRecord {
    id: i64,
    lab_session_id: i64,
    message: String,
    created_by: String,
    creator_name: Option<String>,
    created_at: String,
}
impl AnnouncementRecord {
    fn to_domain(self) -> Announcement {
        Announcement {
            id: self.id,
            lab_session_id: self.lab_session_id,
            message: self.message,
            created_by: self.created_by,
            creator_name: self.creator_name,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct ChatRecord {
    id: i64,
    lab_session_id: i64,
    sender_id: String,
    sender_name: Option<String>,
    receiver_id: Option<String>,
    receiver_name: Option<String>,
    message: String,
    created_at: String,
}
impl ChatRecord {
    fn to_domain(self) -> ChatMessage {
        ChatMessage {
            id: self.id,
            lab_session_id: self.lab_session_id,
            sender_id: self.sender_id,
            sender_name: self.sender_name,
            receiver_id: self.receiver_id,
            receiver_name: self.receiver_name,
            message: self.message,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct CodeFileRecord {
    id: i64,
    lab_session_id: i64,
    student_id: String,
    file_name: String,
    language: String,
    code: String,
    last_updated: String,
}
impl CodeFileRecord {
    fn to_domain(self) -> CodeFile {
        CodeFile {
            id: self.id,
            lab_session_id: self.lab_session_id,
            student_id: self.student_id,
            file_name: self.file_name,
            language: self.language,
            code: self.code,
            last_updated: self.last_updated,
        }
    }
}

#[derive(FromRow)]
struct CodeFileDetailsRecord {
    id: i64,
    lab_session_id: i64,
    student_id: String,
    student_name: Option<String>,
    student_email: Option<String>,
    file_name: String,
    language: String,
    code: String,
    last_updated: String,
}
impl CodeFileDetailsRecord {
    fn to_domain(self) -> CodeFileDetails {
        CodeFileDetails {
            file: CodeFile {
                id: self.id,
                lab_session_id: self.lab_session_id,
                student_id: self.student_id,
                file_name: self.file_name,
                language: self.language,
                code: self.code,
                last_updated: self.last_updated,
            },
            student_name: self.student_name,
            student_email: self.student_email,
        }
    }
}

//=========================================================================================
// Shared SQL fragments
//=========================================================================================

const LAB_SESSION_COLUMNS: &str =
    "id, session_code, title, description, teacher_id, is_active, created_at";

const CODE_FILE_COLUMNS: &str =
    "id, lab_session_id, student_id, file_name, language, code, last_updated";

const ANNOUNCEMENT_SELECT: &str = r#"
    SELECT a.id, a.lab_session_id, a.message, a.created_by,
           u.full_name AS creator_name, a.created_at
    FROM lab_announcements a
    LEFT JOIN users u ON u.id = a.created_by
"#;

const CHAT_SELECT: &str = r#"
    SELECT c.id, c.lab_session_id, c.sender_id, s.full_name AS sender_name,
           c.receiver_id, r.full_name AS receiver_name, c.message, c.created_at
    FROM lab_chats c
    LEFT JOIN users s ON s.id = c.sender_id
    LEFT JOIN users r ON r.id = c.receiver_id
"#;

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user(&self, user: &NewUser) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (id, email, full_name, role, created_at) VALUES (?, ?, ?, ?, ?) \
             RETURNING id, email, full_name, role, created_at",
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(user.role.as_str())
        .bind(timestamp_now())
        .fetch_one(&self.pool)
        .await
        .map_err(write_error)?;
        record.to_domain()
    }

    async fn get_user(&self, user_id: &str) -> PortResult<User> {
        sqlx::query_as::<_, UserRecord>(
            "SELECT id, email, full_name, role, created_at FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?
        .to_domain()
    }

    async fn create_lab_session(&self, session: &NewLabSession) -> PortResult<LabSession> {
        let sql = format!(
            "INSERT INTO lab_sessions (session_code, title, description, teacher_id, is_active, created_at) \
             VALUES (?, ?, ?, ?, 1, ?) RETURNING {}",
            LAB_SESSION_COLUMNS
        );
        let record = sqlx::query_as::<_, LabSessionRecord>(&sql)
            .bind(&session.session_code)
            .bind(&session.title)
            .bind(&session.description)
            .bind(&session.teacher_id)
            .bind(timestamp_now())
            .fetch_one(&self.pool)
            .await
            .map_err(write_error)?;
        Ok(record.to_domain())
    }

    async fn session_code_exists(&self, session_code: &str) -> PortResult<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM lab_sessions WHERE session_code = ?")
                .bind(session_code)
                .fetch_one(&self.pool)
                .await
                .map_err(unexpected)?;
        Ok(count > 0)
    }

    async fn get_lab_session(&self, lab_session_id: i64) -> PortResult<LabSession> {
        let sql = format!("SELECT {} FROM lab_sessions WHERE id = ?", LAB_SESSION_COLUMNS);
        let record = sqlx::query_as::<_, LabSessionRecord>(&sql)
            .bind(lab_session_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?
            .ok_or_else(|| {
                PortError::NotFound(format!("Lab session {} not found", lab_session_id))
            })?;
        Ok(record.to_domain())
    }

    async fn get_lab_session_details(
        &self,
        lab_session_id: i64,
    ) -> PortResult<LabSessionDetails> {
        let record = sqlx::query_as::<_, LabSessionDetailsRecord>(
            r#"
            SELECT ls.id, ls.session_code, ls.title, ls.description, ls.teacher_id,
                   u.full_name AS teacher_name, ls.is_active, ls.created_at
            FROM lab_sessions ls
            LEFT JOIN users u ON u.id = ls.teacher_id
            WHERE ls.id = ?
            "#,
        )
        .bind(lab_session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound(format!("Lab session {} not found", lab_session_id)))?;
        Ok(record.to_domain())
    }

    async fn find_lab_session_by_code(
        &self,
        session_code: &str,
    ) -> PortResult<Option<LabSession>> {
        let sql = format!(
            "SELECT {} FROM lab_sessions WHERE LOWER(session_code) = LOWER(?) LIMIT 1",
            LAB_SESSION_COLUMNS
        );
        let record = sqlx::query_as::<_, LabSessionRecord>(&sql)
            .bind(session_code)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(record.map(LabSessionRecord::to_domain))
    }

    async fn list_lab_sessions_for_teacher(&self, teacher_id: &str) -> PortResult<Vec<LabSession>> {
        let sql = format!(
            "SELECT {} FROM lab_sessions WHERE teacher_id = ? ORDER BY created_at DESC, id DESC",
            LAB_SESSION_COLUMNS
        );
        let records = sqlx::query_as::<_, LabSessionRecord>(&sql)
            .bind(teacher_id)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn list_lab_sessions_for_student(&self, student_id: &str) -> PortResult<Vec<LabSession>> {
        let records = sqlx::query_as::<_, LabSessionRecord>(
            r#"
            SELECT ls.id, ls.session_code, ls.title, ls.description, ls.teacher_id,
                   ls.is_active, ls.created_at
            FROM lab_sessions ls
            INNER JOIN lab_participants p
                ON p.lab_session_id = ls.id AND p.student_id = ?
            ORDER BY p.joined_at DESC, ls.id DESC
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn find_participant(
        &self,
        lab_session_id: i64,
        student_id: &str,
    ) -> PortResult<Option<Participant>> {
        let record = sqlx::query_as::<_, ParticipantRecord>(
            "SELECT id, lab_session_id, student_id, joined_at FROM lab_participants \
             WHERE lab_session_id = ? AND student_id = ? LIMIT 1",
        )
        .bind(lab_session_id)
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(ParticipantRecord::to_domain))
    }

    async fn add_participant(&self, lab_session_id: i64, student_id: &str) -> PortResult<Participant> {
        let record = sqlx::query_as::<_, ParticipantRecord>(
            "INSERT INTO lab_participants (lab_session_id, student_id, joined_at) VALUES (?, ?, ?) \
             RETURNING id, lab_session_id, student_id, joined_at",
        )
        .bind(lab_session_id)
        .bind(student_id)
        .bind(timestamp_now())
        .fetch_one(&self.pool)
        .await
        .map_err(write_error)?;
        Ok(record.to_domain())
    }

    async fn list_participants(&self, lab_session_id: i64) -> PortResult<Vec<ParticipantDetails>> {
        let records = sqlx::query_as::<_, ParticipantDetailsRecord>(
            r#"
            SELECT p.id, p.lab_session_id, p.student_id, u.full_name AS student_name,
                   u.email AS student_email, p.joined_at
            FROM lab_participants p
            INNER JOIN users u ON u.id = p.student_id
            WHERE p.lab_session_id = ?
            ORDER BY p.joined_at ASC, p.id ASC
            "#,
        )
        .bind(lab_session_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn create_announcement(
        &self,
        lab_session_id: i64,
        created_by: &str,
        message: &str,
    ) -> PortResult<Announcement> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO lab_announcements (lab_session_id, message, created_by, created_at) \
             VALUES (?, ?, ?, ?) RETURNING id",
        )
        .bind(lab_session_id)
        .bind(message)
        .bind(created_by)
        .bind(timestamp_now())
        .fetch_one(&self.pool)
        .await
        .map_err(write_error)?;

        let sql = format!("{} WHERE a.id = ?", ANNOUNCEMENT_SELECT);
        let record = sqlx::query_as::<_, AnnouncementRecord>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn list_announcements(&self, lab_session_id: i64) -> PortResult<Vec<Announcement>> {
        let sql = format!(
            "{} WHERE a.lab_session_id = ? ORDER BY a.created_at DESC, a.id DESC",
            ANNOUNCEMENT_SELECT
        );
        let records = sqlx::query_as::<_, AnnouncementRecord>(&sql)
            .bind(lab_session_id)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn create_chat_message(&self, message: &NewChatMessage) -> PortResult<ChatMessage> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO lab_chats (lab_session_id, sender_id, receiver_id, message, created_at) \
             VALUES (?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(message.lab_session_id)
        .bind(&message.sender_id)
        .bind(&message.receiver_id)
        .bind(&message.message)
        .bind(timestamp_now())
        .fetch_one(&self.pool)
        .await
        .map_err(write_error)?;

        let sql = format!("{} WHERE c.id = ?", CHAT_SELECT);
        let record = sqlx::query_as::<_, ChatRecord>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn list_public_messages(&self, lab_session_id: i64) -> PortResult<Vec<ChatMessage>> {
        let sql = format!(
            "{} WHERE c.lab_session_id = ? AND c.receiver_id IS NULL \
             ORDER BY c.created_at ASC, c.id ASC",
            CHAT_SELECT
        );
        let records = sqlx::query_as::<_, ChatRecord>(&sql)
            .bind(lab_session_id)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn list_private_messages(
        &self,
        lab_session_id: i64,
        user_id: &str,
        other_id: &str,
    ) -> PortResult<Vec<ChatMessage>> {
        let sql = format!(
            "{} WHERE c.lab_session_id = ? \
               AND ((c.sender_id = ? AND c.receiver_id = ?) OR (c.sender_id = ? AND c.receiver_id = ?)) \
             ORDER BY c.created_at ASC, c.id ASC",
            CHAT_SELECT
        );
        let records = sqlx::query_as::<_, ChatRecord>(&sql)
            .bind(lab_session_id)
            .bind(user_id)
            .bind(other_id)
            .bind(other_id)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn upsert_code_file(&self, submission: &CodeSubmission) -> PortResult<Upserted<CodeFile>> {
        let last_updated = timestamp_now();

        if let Some(record) = self.update_code_file(submission, &last_updated).await? {
            return Ok(Upserted::Updated(record.to_domain()));
        }

        match self.insert_code_file(submission, &last_updated).await {
            Ok(record) => Ok(Upserted::Created(record.to_domain())),
            // A concurrent save created the file first; overwrite it instead.
            Err(PortError::Conflict(_)) => self
                .update_code_file(submission, &last_updated)
                .await?
                .map(|record| Upserted::Updated(record.to_domain()))
                .ok_or_else(|| {
                    PortError::Unexpected(format!(
                        "code file {} vanished after conflict",
                        submission.file_name
                    ))
                }),
            Err(e) => Err(e),
        }
    }

    async fn list_code_files(
        &self,
        lab_session_id: i64,
        student_id: Option<&str>,
    ) -> PortResult<Vec<CodeFile>> {
        let sql = format!(
            "SELECT {} FROM lab_codes WHERE lab_session_id = ? AND (? IS NULL OR student_id = ?) \
             ORDER BY last_updated DESC, id DESC",
            CODE_FILE_COLUMNS
        );
        let records = sqlx::query_as::<_, CodeFileRecord>(&sql)
            .bind(lab_session_id)
            .bind(student_id)
            .bind(student_id)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn list_code_files_with_students(
        &self,
        lab_session_id: i64,
    ) -> PortResult<Vec<CodeFileDetails>> {
        let records = sqlx::query_as::<_, CodeFileDetailsRecord>(
            r#"
            SELECT c.id, c.lab_session_id, c.student_id, u.full_name AS student_name,
                   u.email AS student_email, c.file_name, c.language, c.code, c.last_updated
            FROM lab_codes c
            LEFT JOIN users u ON u.id = c.student_id
            WHERE c.lab_session_id = ?
            ORDER BY u.full_name ASC, c.file_name ASC
            "#,
        )
        .bind(lab_session_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }
}

//=========================================================================================
// Tests
//=========================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use codelab_core::domain::Role;
    use codelab_core::session_code::{generate_unique_session_code, SESSION_CODE_LEN};

    async fn setup() -> DbAdapter {
        DbAdapter::in_memory().await.unwrap()
    }

    async fn user(db: &DbAdapter, id: &str, name: &str, role: Role) -> User {
        db.create_user(&NewUser {
            id: id.to_string(),
            email: format!("{}@example.com", id),
            full_name: name.to_string(),
            role,
        })
        .await
        .unwrap()
    }

    async fn lab(db: &DbAdapter, code: &str, teacher_id: &str) -> LabSession {
        db.create_lab_session(&NewLabSession {
            session_code: code.to_string(),
            title: "Intro to Python".to_string(),
            description: Some("Basics".to_string()),
            teacher_id: teacher_id.to_string(),
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn users_round_trip_and_reject_duplicates() {
        let db = setup().await;
        let created = user(&db, "teacher123", "John Teacher", Role::Teacher).await;
        assert_eq!(created.role, Role::Teacher);

        let fetched = db.get_user("teacher123").await.unwrap();
        assert_eq!(fetched.full_name, "John Teacher");

        let dup = db
            .create_user(&NewUser {
                id: "other".to_string(),
                email: "teacher123@example.com".to_string(),
                full_name: "Someone".to_string(),
                role: Role::Student,
            })
            .await;
        assert!(matches!(dup, Err(PortError::Conflict(_))));

        assert!(matches!(db.get_user("ghost").await, Err(PortError::NotFound(_))));
    }

    #[tokio::test]
    async fn session_codes_are_unique_and_found_case_insensitively() {
        let db = setup().await;
        user(&db, "t1", "Teacher", Role::Teacher).await;
        let created = lab(&db, "ABC123", "t1").await;
        assert!(created.is_active);
        assert!(db.session_code_exists("ABC123").await.unwrap());

        let found = db.find_lab_session_by_code("abc123").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);

        let dup = db
            .create_lab_session(&NewLabSession {
                session_code: "abc123".to_string(),
                title: "Other".to_string(),
                description: None,
                teacher_id: "t1".to_string(),
            })
            .await;
        assert!(matches!(dup, Err(PortError::Conflict(_))));

        let fresh = generate_unique_session_code(&db).await.unwrap().unwrap();
        assert_eq!(fresh.len(), SESSION_CODE_LEN);
        assert_ne!(fresh, "ABC123");
    }

    #[tokio::test]
    async fn session_details_carry_teacher_name() {
        let db = setup().await;
        user(&db, "t1", "Jane Instructor", Role::Teacher).await;
        let created = lab(&db, "WEB101", "t1").await;

        let details = db.get_lab_session_details(created.id).await.unwrap();
        assert_eq!(details.teacher_name.as_deref(), Some("Jane Instructor"));
        assert!(matches!(
            db.get_lab_session_details(created.id + 1).await,
            Err(PortError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn participants_are_unique_per_session_and_student() {
        let db = setup().await;
        user(&db, "t1", "Teacher", Role::Teacher).await;
        user(&db, "s1", "Alice Student", Role::Student).await;
        let session = lab(&db, "JS2024", "t1").await;

        let joined = db.add_participant(session.id, "s1").await.unwrap();
        assert_eq!(db.find_participant(session.id, "s1").await.unwrap(), Some(joined));
        assert!(matches!(
            db.add_participant(session.id, "s1").await,
            Err(PortError::Conflict(_))
        ));

        let listed = db.list_participants(session.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].student_name, "Alice Student");
        assert_eq!(listed[0].student_email, "s1@example.com");

        let enrolled = db.list_lab_sessions_for_student("s1").await.unwrap();
        assert_eq!(enrolled.len(), 1);
        assert_eq!(enrolled[0].session_code, "JS2024");
        assert!(db.list_lab_sessions_for_student("t1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn code_files_upsert_by_file_name() {
        let db = setup().await;
        user(&db, "t1", "Teacher", Role::Teacher).await;
        user(&db, "s1", "Bob Learner", Role::Student).await;
        let session = lab(&db, "PY0001", "t1").await;

        let mut submission = CodeSubmission {
            lab_session_id: session.id,
            student_id: "s1".to_string(),
            file_name: "main.py".to_string(),
            language: "python".to_string(),
            code: "print(1)".to_string(),
        };
        let first = db.upsert_code_file(&submission).await.unwrap();
        assert!(first.was_created());
        let first = first.into_inner();

        submission.code = "print(2)".to_string();
        let second = db.upsert_code_file(&submission).await.unwrap();
        assert!(!second.was_created());
        let second = second.into_inner();
        assert_eq!(second.id, first.id);
        assert_eq!(second.code, "print(2)");
        assert!(second.last_updated >= first.last_updated);

        let files = db.list_code_files(session.id, None).await.unwrap();
        assert_eq!(files.len(), 1);
        assert!(db.list_code_files(session.id, Some("t1")).await.unwrap().is_empty());

        let detailed = db.list_code_files_with_students(session.id).await.unwrap();
        assert_eq!(detailed[0].student_name.as_deref(), Some("Bob Learner"));
    }

    #[tokio::test]
    async fn concurrent_saves_of_a_new_file_both_succeed() {
        let db = setup().await;
        user(&db, "t1", "Teacher", Role::Teacher).await;
        user(&db, "s1", "Bob Learner", Role::Student).await;
        let session = lab(&db, "PY0002", "t1").await;

        let submission = |code: &str| CodeSubmission {
            lab_session_id: session.id,
            student_id: "s1".to_string(),
            file_name: "main.py".to_string(),
            language: "python".to_string(),
            code: code.to_string(),
        };
        let (a, b) = (submission("print('a')"), submission("print('b')"));

        // The losing insert hits the unique key directly.
        let stamp = timestamp_now();
        db.insert_code_file(&a, &stamp).await.unwrap();
        assert!(matches!(
            db.insert_code_file(&b, &stamp).await,
            Err(PortError::Conflict(_))
        ));
        sqlx::query("DELETE FROM lab_codes").execute(db.pool()).await.unwrap();

        let (first, second) = tokio::join!(db.upsert_code_file(&a), db.upsert_code_file(&b));
        let (first, second) = (first.unwrap(), second.unwrap());
        assert!(first.was_created() ^ second.was_created());
        assert_eq!(first.into_inner().id, second.into_inner().id);
        assert_eq!(db.list_code_files(session.id, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn private_threads_include_both_directions_only() {
        let db = setup().await;
        user(&db, "t1", "Teacher", Role::Teacher).await;
        user(&db, "s1", "Alice", Role::Student).await;
        user(&db, "s2", "Bob", Role::Student).await;
        let session = lab(&db, "CHAT01", "t1").await;

        let send = |sender: &str, receiver: Option<&str>, text: &str| NewChatMessage {
            lab_session_id: session.id,
            sender_id: sender.to_string(),
            receiver_id: receiver.map(str::to_string),
            message: text.to_string(),
        };

        db.create_chat_message(&send("t1", None, "welcome")).await.unwrap();
        let question = db
            .create_chat_message(&send("s1", Some("t1"), "help?"))
            .await
            .unwrap();
        assert_eq!(question.sender_name.as_deref(), Some("Alice"));
        assert_eq!(question.receiver_name.as_deref(), Some("Teacher"));
        db.create_chat_message(&send("t1", Some("s1"), "sure")).await.unwrap();
        db.create_chat_message(&send("s2", Some("t1"), "me too")).await.unwrap();

        let public = db.list_public_messages(session.id).await.unwrap();
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].message, "welcome");

        let thread = db.list_private_messages(session.id, "t1", "s1").await.unwrap();
        let texts: Vec<_> = thread.iter().map(|m| m.message.as_str()).collect();
        assert_eq!(texts, vec!["help?", "sure"]);
    }

    #[tokio::test]
    async fn announcements_list_newest_first() {
        let db = setup().await;
        user(&db, "t1", "John Teacher", Role::Teacher).await;
        let session = lab(&db, "ANN001", "t1").await;

        db.create_announcement(session.id, "t1", "first").await.unwrap();
        let latest = db.create_announcement(session.id, "t1", "second").await.unwrap();
        assert_eq!(latest.creator_name.as_deref(), Some("John Teacher"));

        let listed = db.list_announcements(session.id).await.unwrap();
        let texts: Vec<_> = listed.iter().map(|a| a.message.as_str()).collect();
        assert_eq!(texts, vec!["second", "first"]);
    }
}
