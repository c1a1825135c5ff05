// Domain Layer - Pure workflow entities

pub mod error;
pub mod history;
pub mod match_result;
pub mod session;
pub mod staged_file;

// Re-exports
pub use error::DomainError;
pub use history::HistoryRecord;
pub use match_result::{split_skills, MatchPair, MatchPayload, MatchResult};
pub use session::{Credentials, PersistedSession, Session};
pub use staged_file::{DocumentKind, StagedFile, UploadMessage, UploadReceipt};
