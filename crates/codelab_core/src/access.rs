//! crates/codelab_core/src/access.rs
//!
//! The membership rule shared by every session-scoped endpoint: a teacher may
//! act on the sessions they own, a student on the sessions they have joined.

use crate::domain::{LabSession, Role};
use crate::ports::{DatabaseService, PortResult};

/// Returns `true` when `user_id`, acting as `role`, belongs to `session`.
pub async fn is_session_member(
    db: &dyn DatabaseService,
    session: &LabSession,
    user_id: &str,
    role: Role,
) -> PortResult<bool> {
    match role {
        Role::Teacher => Ok(owns_session(session, user_id)),
        Role::Student => Ok(db.find_participant(session.id, user_id).await?.is_some()),
    }
}

pub fn owns_session(session: &LabSession, user_id: &str) -> bool {
    session.teacher_id == user_id
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(teacher_id: &str) -> LabSession {
        LabSession {
            id: 1,
            session_code: "TEST01".to_string(),
            title: "Intro".to_string(),
            description: None,
            teacher_id: teacher_id.to_string(),
            is_active: true,
            created_at: "2024-12-20T00:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn only_the_owner_owns_a_session() {
        let s = session("teacher123");
        assert!(owns_session(&s, "teacher123"));
        assert!(!owns_session(&s, "teacher456"));
        assert!(!owns_session(&s, ""));
    }
}
