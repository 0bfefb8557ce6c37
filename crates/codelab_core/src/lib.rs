pub mod access;
pub mod domain;
pub mod languages;
pub mod ports;
pub mod session_code;

pub use domain::{
    Announcement, ChatMessage, CodeFile, CodeFileDetails, CodeSubmission, ExecutionRequest,
    LabSession, LabSessionDetails, NewChatMessage, NewLabSession, NewUser, Participant,
    ParticipantDetails, Role, Upserted, User,
};
pub use ports::{CodeExecutionService, DatabaseService, PortError, PortResult};
