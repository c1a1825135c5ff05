//! Edge Case Tests
//!
//! Late responses, reselection during uploads and overlapping refreshes.

use async_trait::async_trait;
use lopdf::Document;
use resume_match_core::application::{
    HistoryCache, MatchOutcome, RefreshOutcome, WorkflowController, WorkflowState,
};
use resume_match_core::domain::{HistoryRecord, MatchPair, MatchPayload, Session, StagedFile};
use resume_match_core::port::scoring_service::mocks::MockScoringService;
use resume_match_core::port::time_provider::mocks::FixedClock;
use resume_match_core::port::{HistorySource, RemoteCallError};
use resume_match_core::AppError;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

fn setup() -> (Arc<MockScoringService>, Arc<WorkflowController>) {
    let service = Arc::new(MockScoringService::new());
    let session = Session {
        session_id: "session-1".to_string(),
        username: Some("hr".to_string()),
        authenticated: true,
    };
    let controller = WorkflowController::new(
        &session,
        service.clone(),
        service.clone(),
        Arc::new(HistoryCache::new(service.clone())),
        Arc::new(FixedClock::new_default()),
        MatchPair::EXAMPLE,
    )
    .unwrap();
    (service, Arc::new(controller))
}

fn file(name: &str) -> StagedFile {
    StagedFile::new(name, b"document".to_vec())
}

async fn until(condition: impl Fn() -> bool) {
    while !condition() {
        tokio::task::yield_now().await;
    }
}

/// Edge Case 1: A match response arriving after reset is dropped
#[tokio::test]
async fn test_match_after_reset_is_discarded() {
    let (service, controller) = setup();
    service.hold_matches();
    controller.select_resume(file("resume.pdf"));
    controller.select_job(file("job.pdf"));

    let pending = tokio::spawn({
        let controller = controller.clone();
        async move { controller.request_match().await }
    });
    until(|| service.match_calls() == 1).await;

    controller.reset();
    service.release_match();

    assert!(matches!(pending.await.unwrap(), Err(AppError::Superseded(_))));
    assert_eq!(controller.state(), WorkflowState::Idle);
    assert!(controller.snapshot().result.is_none());
    assert_eq!(service.history_calls(), 0, "no refresh for a discarded match");

    println!("✅ Edge 1: Stale match dropped after reset");
}

/// Edge Case 2: A failed match arriving after reset raises no alert
#[tokio::test]
async fn test_failed_match_after_reset_leaves_no_alert() {
    let (service, controller) = setup();
    service.hold_matches();
    service.fail_matches("HTTP 500");
    controller.select_resume(file("resume.pdf"));
    controller.select_job(file("job.pdf"));

    let pending = tokio::spawn({
        let controller = controller.clone();
        async move { controller.request_match().await }
    });
    until(|| service.match_calls() == 1).await;
    controller.reset();
    service.release_match();

    assert!(matches!(pending.await.unwrap(), Err(AppError::Superseded(_))));
    assert!(controller.snapshot().alert.is_none());

    println!("✅ Edge 2: Stale failure dropped after reset");
}

/// Edge Case 3: An upload answered after its slot was reselected is dropped
#[tokio::test]
async fn test_upload_after_reselect_is_discarded() {
    let (service, controller) = setup();
    service.hold_uploads();
    controller.select_resume(file("old.pdf"));

    let pending = tokio::spawn({
        let controller = controller.clone();
        async move { controller.upload_resume().await }
    });
    until(|| service.upload_calls() == 1).await;
    assert_eq!(controller.state(), WorkflowState::Uploading);

    controller.select_resume(file("new.pdf"));
    service.release_upload();

    assert!(matches!(pending.await.unwrap(), Err(AppError::Superseded(_))));
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.resume.file_name.as_deref(), Some("new.pdf"));
    assert!(snapshot.resume.message.is_none());
    assert!(!snapshot.resume.uploading);
    assert_eq!(snapshot.state, WorkflowState::ResumeStaged);

    println!("✅ Edge 3: Upload for a replaced file dropped");
}

/// Edge Case 4: Reselecting the other slot does not invalidate an upload
#[tokio::test]
async fn test_upload_survives_other_slot_reselect() {
    let (service, controller) = setup();
    service.hold_uploads();
    controller.select_resume(file("resume.pdf"));

    let pending = tokio::spawn({
        let controller = controller.clone();
        async move { controller.upload_resume().await }
    });
    until(|| service.upload_calls() == 1).await;

    controller.select_job(file("job.pdf"));
    service.release_upload();

    assert!(pending.await.unwrap().is_ok());
    assert!(controller
        .snapshot()
        .resume
        .message
        .is_some_and(|m| m.is_confirmed()));

    println!("✅ Edge 4: Slots are independent");
}

/// Edge Case 5: Match only needs staged files, not uploads
#[tokio::test]
async fn test_match_with_failed_uploads() {
    let (service, controller) = setup();
    service.fail_uploads("connection refused");
    controller.select_resume(file("resume.pdf"));
    controller.select_job(file("job.pdf"));
    let _ = controller.upload_resume().await;

    let outcome = controller.request_match().await.unwrap();

    assert!(matches!(outcome, MatchOutcome::Completed(_)));
    assert_eq!(service.requested_pairs(), vec![MatchPair::new(1, 1)]);

    println!("✅ Edge 5: Match issued with the fixed pair");
}

/// Edge Case 6: Missing score and blank skill segments
#[tokio::test]
async fn test_sparse_match_payload() {
    let (service, controller) = setup();
    service.set_match_reply(MatchPayload {
        match_score: None,
        matched_skills: Some(" , Java,, ".to_string()),
        missing_skills: None,
    });
    controller.select_resume(file("resume.pdf"));
    controller.select_job(file("job.pdf"));

    let MatchOutcome::Completed(result) = controller.request_match().await.unwrap() else {
        panic!("expected a completed match");
    };

    assert_eq!(result.match_score, 0.0);
    assert_eq!(result.matched_skills, vec!["Java"]);
    assert!(result.missing_skills.is_empty());
    assert!(controller.export_csv().is_some(), "zero score still exports");

    println!("✅ Edge 6: Sparse payload normalized");
}

/// Edge Case 7: Long skill lists paginate the PDF export
#[tokio::test]
async fn test_pdf_paginates_long_lists() {
    let (service, controller) = setup();
    let skills: Vec<String> = (0..1200).map(|i| format!("Skill{}", i)).collect();
    service.set_match_reply(MatchPayload {
        match_score: Some(12.0),
        matched_skills: Some(skills.join(", ")),
        missing_skills: Some(skills.join(", ")),
    });
    controller.select_resume(file("resume.pdf"));
    controller.select_job(file("job.pdf"));
    controller.request_match().await.unwrap();

    let first = controller.export_pdf().unwrap().unwrap();
    let second = controller.export_pdf().unwrap().unwrap();

    assert_eq!(first.bytes, second.bytes, "PDF export is deterministic");
    let doc = Document::load_mem(&first.bytes).unwrap();
    assert!(doc.get_pages().len() > 1);

    println!("✅ Edge 7: {} PDF pages", doc.get_pages().len());
}

/// Edge Case 9: An upload answered after reset writes no message
#[tokio::test]
async fn test_upload_after_reset_is_discarded() {
    let (service, controller) = setup();
    service.hold_uploads();
    controller.select_resume(file("resume.pdf"));

    let pending = tokio::spawn({
        let controller = controller.clone();
        async move { controller.upload_resume().await }
    });
    until(|| service.upload_calls() == 1).await;

    controller.reset();
    service.release_upload();

    assert!(matches!(pending.await.unwrap(), Err(AppError::Superseded(_))));
    let snapshot = controller.snapshot();
    assert!(snapshot.resume.message.is_none());
    assert!(snapshot.resume.file_name.is_none());
    assert_eq!(snapshot.state, WorkflowState::Idle);

    println!("✅ Edge 9: Upload receipt dropped after reset");
}

/// History source whose calls are answered in an order chosen by the test
#[derive(Default)]
struct ScriptedHistory {
    replies: Mutex<VecDeque<oneshot::Receiver<Vec<HistoryRecord>>>>,
}

impl ScriptedHistory {
    fn expect_call(&self) -> oneshot::Sender<Vec<HistoryRecord>> {
        let (tx, rx) = oneshot::channel();
        self.replies.lock().unwrap().push_back(rx);
        tx
    }
}

#[async_trait]
impl HistorySource for ScriptedHistory {
    async fn fetch_history(&self) -> Result<Vec<HistoryRecord>, RemoteCallError> {
        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(rx) => rx.await.map_err(|_| RemoteCallError::Transport {
                endpoint: "history".to_string(),
                message: "reply dropped".to_string(),
            }),
            None => Ok(Vec::new()),
        }
    }
}

fn record(id: i64) -> HistoryRecord {
    HistoryRecord {
        id,
        resume_id: 1,
        job_id: 1,
        matched_skills: None,
        missing_skills: None,
        match_score: Some(10.0),
        timestamp: None,
    }
}

/// Edge Case 8: An older refresh finishing last cannot roll the cache back
#[tokio::test]
async fn test_overlapping_refreshes_keep_newest() {
    let source = Arc::new(ScriptedHistory::default());
    let cache = Arc::new(HistoryCache::new(source.clone()));
    let older_reply = source.expect_call();
    let newer_reply = source.expect_call();

    let older = tokio::spawn({
        let cache = cache.clone();
        async move { cache.refresh().await }
    });
    tokio::task::yield_now().await;
    let newer = tokio::spawn({
        let cache = cache.clone();
        async move { cache.refresh().await }
    });
    tokio::task::yield_now().await;

    newer_reply.send(vec![record(1), record(2)]).unwrap();
    assert_eq!(newer.await.unwrap(), RefreshOutcome::Refreshed { count: 2 });

    older_reply.send(vec![record(1)]).unwrap();
    assert_eq!(older.await.unwrap(), RefreshOutcome::Superseded);

    assert_eq!(cache.len(), 2);

    println!("✅ Edge 8: Older history response ignored");
}
