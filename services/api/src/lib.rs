//! services/api/src/lib.rs
//!
//! The CodeLab HTTP service: configuration, storage and execution adapters,
//! and the axum web layer.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
