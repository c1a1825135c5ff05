// Workflow Controller - stage, upload, match, export, reset
//
// Remote calls run with the state lock released; every response is checked
// against the generation (bumped by reset) and, for uploads, the slot epoch
// (bumped by reselection) it was issued under before it is applied.

mod state;

pub use state::{SlotSnapshot, WorkflowSnapshot, WorkflowState};

use crate::application::constants::MATCH_FAILED_ALERT;
use crate::application::export::{csv, pdf, ExportArtifact, ExportReport};
use crate::application::history_cache::{HistoryCache, RefreshOutcome};
use crate::application::lock;
use crate::domain::{
    DocumentKind, DomainError, HistoryRecord, MatchPair, MatchResult, Session, StagedFile,
    UploadMessage, UploadReceipt,
};
use crate::error::{AppError, Result};
use crate::port::{Clock, MatchRequester, UploadGateway};
use state::WorkflowInner;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Result of a match request that was not rejected
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    /// Response applied as the current result
    Completed(MatchResult),
    /// Another request was pending; nothing was sent
    AlreadyInFlight,
}

/// Drives one operator's resume/job matching workflow
pub struct WorkflowController {
    operator: String,
    uploads: Arc<dyn UploadGateway>,
    matcher: Arc<dyn MatchRequester>,
    history: Arc<HistoryCache>,
    clock: Arc<dyn Clock>,
    pair: MatchPair,
    inner: Mutex<WorkflowInner>,
    refresh_task: Mutex<Option<JoinHandle<RefreshOutcome>>>,
}

impl WorkflowController {
    /// Build a controller for an authenticated session
    ///
    /// # Errors
    /// - `AppError::Unauthenticated` if the session has not logged in
    pub fn new(
        session: &Session,
        uploads: Arc<dyn UploadGateway>,
        matcher: Arc<dyn MatchRequester>,
        history: Arc<HistoryCache>,
        clock: Arc<dyn Clock>,
        pair: MatchPair,
    ) -> Result<Self> {
        if !session.is_authenticated() {
            warn!(session_id = %session.session_id, "Workflow requested without login");
            return Err(AppError::Unauthenticated);
        }

        Ok(Self {
            operator: session.display_name().to_string(),
            uploads,
            matcher,
            history,
            clock,
            pair,
            inner: Mutex::new(WorkflowInner::default()),
            refresh_task: Mutex::new(None),
        })
    }

    /// Fire the initial history refresh
    ///
    /// Must be called from within a tokio runtime.
    pub fn mount(&self) -> Result<()> {
        info!(operator = %self.operator, "Workflow mounted");
        self.spawn_history_refresh()
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    pub fn select_resume(&self, file: StagedFile) {
        self.select(DocumentKind::Resume, file);
    }

    pub fn select_job(&self, file: StagedFile) {
        self.select(DocumentKind::JobDescription, file);
    }

    /// Stage a file, replacing whatever the slot held
    ///
    /// Any upload still in flight for the slot will be discarded on arrival.
    pub fn select(&self, kind: DocumentKind, file: StagedFile) {
        info!(slot = %kind, file = file.name(), bytes = file.len(), "File staged");
        lock(&self.inner).slot_mut(kind).stage(file);
    }

    // ------------------------------------------------------------------
    // Upload
    // ------------------------------------------------------------------

    pub async fn upload_resume(&self) -> Result<UploadReceipt> {
        self.upload(DocumentKind::Resume).await
    }

    pub async fn upload_job(&self) -> Result<UploadReceipt> {
        self.upload(DocumentKind::JobDescription).await
    }

    /// Upload the file staged in `kind`
    ///
    /// # Errors
    /// - `AppError::Validation` if the slot is empty (nothing changes)
    /// - `AppError::Remote` if the call failed; the slot message records it
    /// - `AppError::Superseded` if the workflow was reset or the slot
    ///   reselected before the response arrived
    pub async fn upload(&self, kind: DocumentKind) -> Result<UploadReceipt> {
        let (file, generation, epoch) = {
            let mut inner = lock(&self.inner);
            let generation = inner.generation;
            let slot = inner.slot_mut(kind);
            let file = match &slot.file {
                Some(file) => file.clone(),
                None => return Err(not_staged(kind).into()),
            };
            slot.uploads_in_flight += 1;
            (file, generation, slot.epoch)
        };

        info!(slot = %kind, file = file.name(), "Uploading document");
        let reply = self.uploads.upload(kind, &file).await;

        let mut inner = lock(&self.inner);
        if inner.generation != generation || inner.slot(kind).epoch != epoch {
            debug!(slot = %kind, generation, epoch, "Discarding stale upload response");
            return Err(AppError::Superseded(format!("{} upload", kind.label())));
        }

        let slot = inner.slot_mut(kind);
        slot.uploads_in_flight = slot.uploads_in_flight.saturating_sub(1);
        match reply {
            Ok(receipt) => {
                info!(slot = %kind, message = %receipt.message, "Upload confirmed");
                slot.message = Some(UploadMessage::Confirmed(receipt.clone()));
                Ok(receipt)
            }
            Err(e) => {
                warn!(slot = %kind, error = %e, "Upload failed");
                slot.message = Some(UploadMessage::failed(kind, &e));
                Err(e.into())
            }
        }
    }

    // ------------------------------------------------------------------
    // Match
    // ------------------------------------------------------------------

    /// Request a score for the configured pair
    ///
    /// A call made while another is pending returns
    /// `MatchOutcome::AlreadyInFlight` without contacting the service. On
    /// success the result is replaced and a history refresh is spawned.
    ///
    /// # Errors
    /// - `AppError::Validation` unless both slots are staged
    /// - `AppError::Remote` on failure; the alert is set, the prior result kept
    /// - `AppError::Superseded` if the workflow was reset meanwhile
    pub async fn request_match(&self) -> Result<MatchOutcome> {
        let generation = {
            let mut inner = lock(&self.inner);
            if inner.match_in_flight {
                debug!("Match already in flight; ignoring request");
                return Ok(MatchOutcome::AlreadyInFlight);
            }
            if inner.slots.iter().any(|s| s.file.is_none()) {
                return Err(DomainError::PairNotStaged.into());
            }
            inner.match_in_flight = true;
            inner.alert = None;
            inner.generation
        };

        info!(
            resume_id = self.pair.resume_id,
            job_id = self.pair.job_id,
            generation,
            "Requesting match"
        );
        let reply = self.matcher.request_match(self.pair).await;

        let result = {
            let mut inner = lock(&self.inner);
            if inner.generation != generation {
                debug!(generation, current = inner.generation, "Discarding stale match response");
                return Err(AppError::Superseded("match".to_string()));
            }
            inner.match_in_flight = false;

            match reply {
                Ok(payload) => {
                    let result = MatchResult::from_payload(payload, self.clock.now_local());
                    inner.result = Some(result.clone());
                    result
                }
                Err(e) => {
                    warn!(error = %e, "Match request failed");
                    inner.alert = Some(MATCH_FAILED_ALERT.to_string());
                    return Err(e.into());
                }
            }
        };

        info!(
            score = result.match_score,
            matched = result.matched_skills.len(),
            missing = result.missing_skills.len(),
            "Match result applied"
        );
        // Result is already visible; the refresh outcome cannot affect it
        if let Err(e) = self.spawn_history_refresh() {
            warn!(error = %e, "History refresh not started");
        }
        Ok(MatchOutcome::Completed(result))
    }

    // ------------------------------------------------------------------
    // Reset / export
    // ------------------------------------------------------------------

    /// Clear slots, messages, alert and result
    ///
    /// In-flight calls are not cancelled; their responses are discarded.
    pub fn reset(&self) {
        let mut inner = lock(&self.inner);
        let generation = inner.generation + 1;
        *inner = WorkflowInner {
            generation,
            ..WorkflowInner::default()
        };
        info!(generation, "Workflow reset");
    }

    /// Delimited-text export, `None` without a result
    pub fn export_csv(&self) -> Option<ExportArtifact> {
        let report = self.export_report()?;
        let artifact = csv::render(&report);
        info!(file = artifact.file_name(), bytes = artifact.bytes.len(), "CSV export generated");
        Some(artifact)
    }

    /// Paginated-document export, `None` without a result
    pub fn export_pdf(&self) -> Result<Option<ExportArtifact>> {
        let Some(report) = self.export_report() else {
            return Ok(None);
        };
        let artifact = pdf::render(&report)?;
        info!(file = artifact.file_name(), bytes = artifact.bytes.len(), "PDF export generated");
        Ok(Some(artifact))
    }

    fn export_report(&self) -> Option<ExportReport> {
        let inner = lock(&self.inner);
        let result = inner.result.as_ref()?;
        Some(ExportReport::new(
            result,
            inner.file_name(DocumentKind::Resume),
            inner.file_name(DocumentKind::JobDescription),
        ))
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    fn spawn_history_refresh(&self) -> Result<()> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| AppError::Internal(format!("history refresh needs a runtime: {}", e)))?;

        let cache = Arc::clone(&self.history);
        let handle = runtime.spawn(async move { cache.refresh().await });
        // A replaced handle keeps running detached
        *lock(&self.refresh_task) = Some(handle);
        Ok(())
    }

    /// Wait for the most recently spawned history refresh
    pub async fn settle_history_refresh(&self) -> Option<RefreshOutcome> {
        let handle = lock(&self.refresh_task).take()?;
        match handle.await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                warn!(error = %e, "History refresh task did not complete");
                None
            }
        }
    }

    pub fn history(&self) -> &Arc<HistoryCache> {
        &self.history
    }

    pub fn history_records(&self) -> Arc<Vec<HistoryRecord>> {
        self.history.records()
    }

    // ------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------

    pub fn snapshot(&self) -> WorkflowSnapshot {
        let history_len = self.history.len();
        lock(&self.inner).snapshot(history_len)
    }

    pub fn state(&self) -> WorkflowState {
        lock(&self.inner).state()
    }
}

fn not_staged(kind: DocumentKind) -> DomainError {
    match kind {
        DocumentKind::Resume => DomainError::ResumeNotStaged,
        DocumentKind::JobDescription => DomainError::JobNotStaged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MatchPayload;
    use crate::port::scoring_service::mocks::MockScoringService;
    use crate::port::time_provider::mocks::FixedClock;

    struct Harness {
        service: Arc<MockScoringService>,
        controller: Arc<WorkflowController>,
    }

    fn session() -> Session {
        Session {
            session_id: "session-1".to_string(),
            username: Some("hr".to_string()),
            authenticated: true,
        }
    }

    fn harness() -> Harness {
        let service = Arc::new(MockScoringService::new());
        let history = Arc::new(HistoryCache::new(service.clone()));
        let controller = WorkflowController::new(
            &session(),
            service.clone(),
            service.clone(),
            history,
            Arc::new(FixedClock::new_default()),
            MatchPair::EXAMPLE,
        )
        .unwrap();
        Harness {
            service,
            controller: Arc::new(controller),
        }
    }

    fn file(name: &str) -> StagedFile {
        StagedFile::new(name, b"%PDF-1.4".to_vec())
    }

    fn stage_both(controller: &WorkflowController) {
        controller.select_resume(file("resume.pdf"));
        controller.select_job(file("job.pdf"));
    }

    async fn wait_for_match_call(service: &MockScoringService, n: usize) {
        while service.match_calls() < n {
            tokio::task::yield_now().await;
        }
    }

    #[test]
    fn test_unauthenticated_session_rejected() {
        let service = Arc::new(MockScoringService::new());
        let result = WorkflowController::new(
            &Session::anonymous("session-1"),
            service.clone(),
            service.clone(),
            Arc::new(HistoryCache::new(service)),
            Arc::new(FixedClock::new_default()),
            MatchPair::EXAMPLE,
        );
        assert!(matches!(result, Err(AppError::Unauthenticated)));
    }

    #[tokio::test]
    async fn test_upload_without_staged_file_is_validation() {
        let h = harness();

        let err = h.controller.upload_resume().await.unwrap_err();

        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Please select a resume file.");
        assert_eq!(h.service.upload_calls(), 0);
        assert_eq!(h.controller.state(), WorkflowState::Idle);
    }

    #[tokio::test]
    async fn test_upload_success_records_receipt() {
        let h = harness();
        h.controller.select_job(file("job.pdf"));

        let receipt = h.controller.upload_job().await.unwrap();

        assert_eq!(receipt.message, "File uploaded successfully");
        let snapshot = h.controller.snapshot();
        assert_eq!(snapshot.state, WorkflowState::Uploaded);
        assert_eq!(
            snapshot.job.message,
            Some(UploadMessage::Confirmed(receipt))
        );
        assert_eq!(
            h.service.uploaded(),
            vec![(DocumentKind::JobDescription, "job.pdf".to_string())]
        );
    }

    #[tokio::test]
    async fn test_upload_failure_records_message_only() {
        let h = harness();
        h.service.fail_uploads("connection refused");
        h.controller.select_resume(file("resume.pdf"));

        let err = h.controller.upload_resume().await.unwrap_err();

        assert!(matches!(err, AppError::Remote(_)));
        let snapshot = h.controller.snapshot();
        assert_eq!(snapshot.state, WorkflowState::ResumeStaged);
        let message = snapshot.resume.message.unwrap().to_string();
        assert!(message.starts_with("Error uploading resume"));
        assert_eq!(h.service.upload_calls(), 1);
    }

    #[tokio::test]
    async fn test_reselect_clears_slot_message() {
        let h = harness();
        h.controller.select_resume(file("a.pdf"));
        h.controller.upload_resume().await.unwrap();

        h.controller.select_resume(file("b.pdf"));

        let snapshot = h.controller.snapshot();
        assert!(snapshot.resume.message.is_none());
        assert_eq!(snapshot.resume.file_name.as_deref(), Some("b.pdf"));
    }

    #[tokio::test]
    async fn test_match_requires_both_slots() {
        let h = harness();
        h.controller.select_resume(file("resume.pdf"));

        let err = h.controller.request_match().await.unwrap_err();

        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Upload both resume and job first.");
        assert_eq!(h.service.match_calls(), 0);
        assert!(h.controller.snapshot().result.is_none());
    }

    #[tokio::test]
    async fn test_match_success_splits_skills_and_refreshes_history() {
        let h = harness();
        stage_both(&h.controller);

        let outcome = h.controller.request_match().await.unwrap();

        let MatchOutcome::Completed(result) = outcome else {
            panic!("expected completed match");
        };
        assert_eq!(result.match_score, 82.0);
        assert_eq!(result.matched_skills, vec!["Java", "SQL"]);
        assert_eq!(result.missing_skills, vec!["Python"]);
        assert_eq!(h.service.requested_pairs(), vec![MatchPair::new(1, 1)]);

        let refreshed = h.controller.settle_history_refresh().await;
        assert_eq!(refreshed, Some(RefreshOutcome::Refreshed { count: 0 }));
        assert_eq!(h.service.history_calls(), 1);
        assert_eq!(h.controller.state(), WorkflowState::Matched);
    }

    #[tokio::test]
    async fn test_match_needs_no_prior_upload() {
        let h = harness();
        stage_both(&h.controller);

        h.controller.request_match().await.unwrap();

        assert_eq!(h.service.upload_calls(), 0);
    }

    #[tokio::test]
    async fn test_match_failure_alerts_and_keeps_prior_result() {
        let h = harness();
        stage_both(&h.controller);
        h.controller.request_match().await.unwrap();

        h.service.fail_matches("HTTP 500");
        let err = h.controller.request_match().await.unwrap_err();

        assert!(matches!(err, AppError::Remote(_)));
        let snapshot = h.controller.snapshot();
        assert_eq!(snapshot.alert.as_deref(), Some(MATCH_FAILED_ALERT));
        assert_eq!(snapshot.result.unwrap().match_score, 82.0);
    }

    #[tokio::test]
    async fn test_history_failure_does_not_touch_result() {
        let h = harness();
        h.service.fail_history("timeout");
        stage_both(&h.controller);

        h.controller.request_match().await.unwrap();
        let refreshed = h.controller.settle_history_refresh().await;

        assert!(matches!(refreshed, Some(RefreshOutcome::Stale(_))));
        assert!(h.controller.snapshot().result.is_some());
    }

    #[tokio::test]
    async fn test_second_match_while_pending_is_noop() {
        let h = harness();
        h.service.hold_matches();
        stage_both(&h.controller);

        let controller = Arc::clone(&h.controller);
        let first = tokio::spawn(async move { controller.request_match().await });
        wait_for_match_call(&h.service, 1).await;

        let second = h.controller.request_match().await.unwrap();
        assert_eq!(second, MatchOutcome::AlreadyInFlight);
        assert_eq!(h.controller.state(), WorkflowState::Matching);

        h.service.release_match();
        let first = first.await.unwrap().unwrap();
        assert!(matches!(first, MatchOutcome::Completed(_)));
        assert_eq!(h.service.match_calls(), 1);
        assert_eq!(h.service.max_matches_in_flight(), 1);
    }

    #[tokio::test]
    async fn test_match_response_after_reset_is_discarded() {
        let h = harness();
        h.service.hold_matches();
        stage_both(&h.controller);

        let controller = Arc::clone(&h.controller);
        let pending = tokio::spawn(async move { controller.request_match().await });
        wait_for_match_call(&h.service, 1).await;

        h.controller.reset();
        h.service.release_match();

        let err = pending.await.unwrap().unwrap_err();
        assert!(matches!(err, AppError::Superseded(_)));
        let snapshot = h.controller.snapshot();
        assert_eq!(snapshot.state, WorkflowState::Idle);
        assert!(snapshot.result.is_none());
        assert_eq!(h.service.history_calls(), 0);
    }

    #[tokio::test]
    async fn test_reset_clears_everything() {
        let h = harness();
        stage_both(&h.controller);
        h.controller.upload_resume().await.unwrap();
        h.controller.request_match().await.unwrap();

        h.controller.reset();

        let snapshot = h.controller.snapshot();
        assert_eq!(snapshot.state, WorkflowState::Idle);
        assert!(snapshot.resume.file_name.is_none());
        assert!(snapshot.resume.message.is_none());
        assert!(snapshot.result.is_none());
        assert!(snapshot.alert.is_none());
    }

    #[tokio::test]
    async fn test_exports_absent_without_result() {
        let h = harness();
        stage_both(&h.controller);

        assert!(h.controller.export_csv().is_none());
        assert!(h.controller.export_pdf().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_exports_use_staged_names_and_do_not_mutate() {
        let h = harness();
        h.service.set_match_reply(MatchPayload {
            match_score: Some(82.0),
            matched_skills: Some("Java".to_string()),
            missing_skills: Some("Python".to_string()),
        });
        stage_both(&h.controller);
        h.controller.request_match().await.unwrap();
        let before = h.controller.snapshot();

        let csv = h.controller.export_csv().unwrap();
        let pdf = h.controller.export_pdf().unwrap().unwrap();

        let text = String::from_utf8(csv.bytes).unwrap();
        assert!(text.starts_with("Field,Value\nResume File,resume.pdf\nJob File,job.pdf"));
        assert!(text.ends_with("Timestamp,2024-01-01 10:00"));
        assert!(pdf.bytes.starts_with(b"%PDF"));
        assert_eq!(h.controller.snapshot(), before);
    }

    #[tokio::test]
    async fn test_mount_fires_initial_refresh() {
        let h = harness();

        h.controller.mount().unwrap();
        h.controller.settle_history_refresh().await;

        assert_eq!(h.service.history_calls(), 1);
    }

    #[test]
    fn test_match_outside_runtime_still_completes() {
        let h = harness();
        stage_both(&h.controller);

        // Polled without a runtime, so no refresh task can be spawned
        let mut task = tokio_test::task::spawn(h.controller.request_match());
        let outcome = tokio_test::assert_ready_ok!(task.poll());
        drop(task);

        assert!(matches!(outcome, MatchOutcome::Completed(_)));
        assert_eq!(h.controller.state(), WorkflowState::Matched);
        assert_eq!(h.service.history_calls(), 0);
    }

    #[tokio::test]
    async fn test_upload_answered_after_reset_leaves_no_message() {
        let h = harness();
        h.service.hold_uploads();
        h.controller.select_job(file("job.pdf"));

        let pending = tokio::spawn({
            let controller = h.controller.clone();
            async move { controller.upload_job().await }
        });
        while h.service.upload_calls() == 0 {
            tokio::task::yield_now().await;
        }
        h.controller.reset();
        h.service.release_upload();

        assert!(matches!(pending.await.unwrap(), Err(AppError::Superseded(_))));
        let snapshot = h.controller.snapshot();
        assert!(snapshot.job.message.is_none());
        assert!(!snapshot.job.uploading);
        assert_eq!(snapshot.state, WorkflowState::Idle);
    }
}
