//! crates/codelab_core/src/session_code.rs
//!
//! Generation of the 6-character join codes teachers hand out to students.

use rand::Rng;

use crate::ports::{DatabaseService, PortResult};

pub const SESSION_CODE_LEN: usize = 6;
pub const MAX_GENERATION_ATTEMPTS: usize = 10;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Draws a random code from `A-Z0-9`.
pub fn generate_session_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..SESSION_CODE_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

/// A code is well-formed when it is exactly six characters long. Case is not significant.
pub fn has_valid_length(code: &str) -> bool {
    code.chars().count() == SESSION_CODE_LEN
}

/// Draws codes until one is not yet taken.
///
/// Returns `Ok(None)` when every attempt collided. The check is optimistic: a
/// concurrent insert can still take the code, in which case the store's unique
/// constraint rejects the later write.
pub async fn generate_unique_session_code(db: &dyn DatabaseService) -> PortResult<Option<String>> {
    for _ in 0..MAX_GENERATION_ATTEMPTS {
        let code = generate_session_code(&mut rand::thread_rng());
        if !db.session_code_exists(&code).await? {
            return Ok(Some(code));
        }
    }
    Ok(None)
}
