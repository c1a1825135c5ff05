// Port Layer - Interfaces for external dependencies

pub mod auth_gateway;
pub mod id_provider; // For deterministic testing
pub mod scoring_service;
pub mod session_store;
pub mod time_provider;

// Re-exports
pub use auth_gateway::{AuthGateway, LoginVerdict, LOGIN_SUCCESS_BODY};
pub use id_provider::IdProvider;
pub use scoring_service::{HistorySource, MatchRequester, RemoteCallError, UploadGateway};
pub use session_store::SessionStore;
pub use time_provider::Clock;
