// Scoring Service Ports (Interfaces)
// The remote service is split by capability: upload, match, history

use crate::domain::{DocumentKind, HistoryRecord, MatchPair, MatchPayload, StagedFile, UploadReceipt};
use async_trait::async_trait;
use thiserror::Error;

/// Network or HTTP failure talking to the remote service
///
/// Never fatal: the workflow converts it into operator feedback.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteCallError {
    #[error("{endpoint}: request failed: {message}")]
    Transport { endpoint: String, message: String },

    #[error("{endpoint}: HTTP {status}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("{endpoint}: invalid response: {message}")]
    Decode { endpoint: String, message: String },
}

impl RemoteCallError {
    pub fn endpoint(&self) -> &str {
        match self {
            RemoteCallError::Transport { endpoint, .. }
            | RemoteCallError::Status { endpoint, .. }
            | RemoteCallError::Decode { endpoint, .. } => endpoint,
        }
    }
}

/// Pushes a staged file to the remote service
#[async_trait]
pub trait UploadGateway: Send + Sync {
    /// Upload one document; no retry on failure
    async fn upload(
        &self,
        kind: DocumentKind,
        file: &StagedFile,
    ) -> Result<UploadReceipt, RemoteCallError>;
}

/// Requests a score for a resume/job pair
///
/// Re-issuing may return different data if the backend recomputed.
#[async_trait]
pub trait MatchRequester: Send + Sync {
    async fn request_match(&self, pair: MatchPair) -> Result<MatchPayload, RemoteCallError>;
}

/// Full ordered history of past matches
#[async_trait]
pub trait HistorySource: Send + Sync {
    async fn fetch_history(&self) -> Result<Vec<HistoryRecord>, RemoteCallError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::sync::Semaphore;

    /// Holds calls until a test releases them
    #[derive(Default)]
    struct Gate {
        semaphore: Mutex<Option<Arc<Semaphore>>>,
    }

    impl Gate {
        fn close(&self) {
            *self.semaphore.lock().unwrap() = Some(Arc::new(Semaphore::new(0)));
        }

        fn release_one(&self) {
            if let Some(sem) = self.semaphore.lock().unwrap().as_ref() {
                sem.add_permits(1);
            }
        }

        async fn pass(&self) {
            let sem = self.semaphore.lock().unwrap().clone();
            if let Some(sem) = sem {
                if let Ok(permit) = sem.acquire().await {
                    permit.forget();
                }
            }
        }
    }

    fn failure(endpoint: &str, message: &str) -> RemoteCallError {
        RemoteCallError::Transport {
            endpoint: endpoint.to_string(),
            message: message.to_string(),
        }
    }

    /// Mock remote service implementing all three scoring ports
    ///
    /// Replies are configurable per capability; gates let a test keep a call
    /// in flight and release it later.
    pub struct MockScoringService {
        upload_reply: Mutex<Result<String, RemoteCallError>>,
        match_reply: Mutex<Result<MatchPayload, RemoteCallError>>,
        history_reply: Mutex<Result<Vec<HistoryRecord>, RemoteCallError>>,
        upload_gate: Gate,
        match_gate: Gate,
        history_gate: Gate,
        upload_calls: AtomicUsize,
        match_calls: AtomicUsize,
        history_calls: AtomicUsize,
        matches_in_flight: AtomicUsize,
        max_matches_in_flight: AtomicUsize,
        uploads: Mutex<Vec<(DocumentKind, String)>>,
        pairs: Mutex<Vec<MatchPair>>,
    }

    impl Default for MockScoringService {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MockScoringService {
        /// Every call succeeds: uploads confirm, match scores 82, history is empty
        pub fn new() -> Self {
            Self {
                upload_reply: Mutex::new(Ok("File uploaded successfully".to_string())),
                match_reply: Mutex::new(Ok(MatchPayload {
                    match_score: Some(82.0),
                    matched_skills: Some("Java, SQL".to_string()),
                    missing_skills: Some("Python".to_string()),
                })),
                history_reply: Mutex::new(Ok(Vec::new())),
                upload_gate: Gate::default(),
                match_gate: Gate::default(),
                history_gate: Gate::default(),
                upload_calls: AtomicUsize::new(0),
                match_calls: AtomicUsize::new(0),
                history_calls: AtomicUsize::new(0),
                matches_in_flight: AtomicUsize::new(0),
                max_matches_in_flight: AtomicUsize::new(0),
                uploads: Mutex::new(Vec::new()),
                pairs: Mutex::new(Vec::new()),
            }
        }

        pub fn set_upload_reply(&self, message: impl Into<String>) {
            *self.upload_reply.lock().unwrap() = Ok(message.into());
        }

        pub fn fail_uploads(&self, message: &str) {
            *self.upload_reply.lock().unwrap() = Err(failure("upload", message));
        }

        pub fn set_match_reply(&self, payload: MatchPayload) {
            *self.match_reply.lock().unwrap() = Ok(payload);
        }

        pub fn fail_matches(&self, message: &str) {
            *self.match_reply.lock().unwrap() = Err(failure("getMatchResult", message));
        }

        pub fn set_history(&self, records: Vec<HistoryRecord>) {
            *self.history_reply.lock().unwrap() = Ok(records);
        }

        pub fn fail_history(&self, message: &str) {
            *self.history_reply.lock().unwrap() = Err(failure("history", message));
        }

        pub fn hold_uploads(&self) {
            self.upload_gate.close();
        }

        pub fn release_upload(&self) {
            self.upload_gate.release_one();
        }

        pub fn hold_matches(&self) {
            self.match_gate.close();
        }

        pub fn release_match(&self) {
            self.match_gate.release_one();
        }

        pub fn hold_history(&self) {
            self.history_gate.close();
        }

        pub fn release_history(&self) {
            self.history_gate.release_one();
        }

        pub fn upload_calls(&self) -> usize {
            self.upload_calls.load(Ordering::SeqCst)
        }

        pub fn match_calls(&self) -> usize {
            self.match_calls.load(Ordering::SeqCst)
        }

        pub fn history_calls(&self) -> usize {
            self.history_calls.load(Ordering::SeqCst)
        }

        pub fn max_matches_in_flight(&self) -> usize {
            self.max_matches_in_flight.load(Ordering::SeqCst)
        }

        /// (slot, file name) of every upload, in call order
        pub fn uploaded(&self) -> Vec<(DocumentKind, String)> {
            self.uploads.lock().unwrap().clone()
        }

        pub fn requested_pairs(&self) -> Vec<MatchPair> {
            self.pairs.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl UploadGateway for MockScoringService {
        async fn upload(
            &self,
            kind: DocumentKind,
            file: &StagedFile,
        ) -> Result<UploadReceipt, RemoteCallError> {
            self.upload_calls.fetch_add(1, Ordering::SeqCst);
            self.uploads
                .lock()
                .unwrap()
                .push((kind, file.name().to_string()));
            // Reply is captured before waiting so a held call answers with the
            // behavior configured when it was issued
            let reply = self.upload_reply.lock().unwrap().clone();
            self.upload_gate.pass().await;
            reply.map(UploadReceipt::new)
        }
    }

    #[async_trait]
    impl MatchRequester for MockScoringService {
        async fn request_match(&self, pair: MatchPair) -> Result<MatchPayload, RemoteCallError> {
            self.match_calls.fetch_add(1, Ordering::SeqCst);
            self.pairs.lock().unwrap().push(pair);
            let now = self.matches_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_matches_in_flight.fetch_max(now, Ordering::SeqCst);

            let reply = self.match_reply.lock().unwrap().clone();
            self.match_gate.pass().await;

            self.matches_in_flight.fetch_sub(1, Ordering::SeqCst);
            reply
        }
    }

    #[async_trait]
    impl HistorySource for MockScoringService {
        async fn fetch_history(&self) -> Result<Vec<HistoryRecord>, RemoteCallError> {
            self.history_calls.fetch_add(1, Ordering::SeqCst);
            let reply = self.history_reply.lock().unwrap().clone();
            self.history_gate.pass().await;
            reply
        }
    }
}
