//! services/api/src/bin/seed.rs
//!
//! Loads a handful of demo users and lab sessions into the configured database.
//! Rows that already exist are skipped, so the seeder can be run repeatedly.

use codelab_api::{adapters::DbAdapter, config::Config, error::ApiError};
use codelab_core::domain::{NewLabSession, NewUser, Role};
use codelab_core::ports::{DatabaseService, PortError};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USERS: &[(&str, &str, &str, Role)] = &[
    ("teacher123", "john.teacher@example.com", "John Teacher", Role::Teacher),
    ("teacher456", "jane.instructor@example.com", "Jane Instructor", Role::Teacher),
    ("student456", "alice.student@example.com", "Alice Student", Role::Student),
    ("student789", "bob.learner@example.com", "Bob Learner", Role::Student),
    ("student012", "charlie.coder@example.com", "Charlie Coder", Role::Student),
];

const LAB_SESSIONS: &[(&str, &str, &str, &str)] = &[
    ("TEST01", "Introduction to Python", "Learn Python basics", "teacher123"),
    ("JS2024", "JavaScript Fundamentals", "Master JavaScript concepts", "teacher123"),
    ("WEB101", "Web Development Bootcamp", "Build your first website", "teacher456"),
];

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db = DbAdapter::connect(&config.database_url, config.database_max_connections).await?;
    db.run_migrations().await?;

    for &(id, email, full_name, role) in USERS {
        let user = NewUser {
            id: id.to_string(),
            email: email.to_string(),
            full_name: full_name.to_string(),
            role,
        };
        match db.create_user(&user).await {
            Ok(_) => info!("Seeded user {}", id),
            Err(PortError::Conflict(_)) => warn!("User {} already exists, skipping", id),
            Err(e) => return Err(e.into()),
        }
    }

    for &(code, title, description, teacher_id) in LAB_SESSIONS {
        let session = NewLabSession {
            session_code: code.to_string(),
            title: title.to_string(),
            description: Some(description.to_string()),
            teacher_id: teacher_id.to_string(),
        };
        match db.create_lab_session(&session).await {
            Ok(created) => info!("Seeded lab session {} ({})", created.id, code),
            Err(PortError::Conflict(_)) => warn!("Lab session {} already exists, skipping", code),
            Err(e) => return Err(e.into()),
        }
    }

    info!("Seeding complete.");
    Ok(())
}
