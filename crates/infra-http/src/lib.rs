// Resume Match Infrastructure - HTTP Adapters
// Implements: UploadGateway, MatchRequester, HistorySource, AuthGateway

pub mod client;
mod endpoints;

pub use client::{HttpClientConfig, ResumeMatchHttpClient, DEFAULT_BASE_URL};
