//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use codelab_core::ports::{CodeExecutionService, DatabaseService};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub executor: Arc<dyn CodeExecutionService>,
}
