pub mod announcements;
pub mod chat;
pub mod code;
pub mod error;
pub mod execute;
pub mod labs;
pub mod params;
pub mod participants;
pub mod rest;
pub mod router;
pub mod state;
pub mod users;

// Re-exported for the binaries that assemble the server.
pub use rest::ApiDoc;
pub use router::router;
