// Workflow state: held data and the state derived from it

use crate::domain::{DocumentKind, MatchResult, StagedFile, UploadMessage};
use std::fmt;

/// Observable workflow state
///
/// Derived from held data on every read, never stored. Exporting and
/// resetting complete synchronously and have no state of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Idle,
    ResumeStaged,
    JobStaged,
    BothStaged,
    Uploading,
    Uploaded,
    Matching,
    Matched,
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WorkflowState::Idle => "IDLE",
            WorkflowState::ResumeStaged => "RESUME_STAGED",
            WorkflowState::JobStaged => "JOB_STAGED",
            WorkflowState::BothStaged => "BOTH_STAGED",
            WorkflowState::Uploading => "UPLOADING",
            WorkflowState::Uploaded => "UPLOADED",
            WorkflowState::Matching => "MATCHING",
            WorkflowState::Matched => "MATCHED",
        };
        write!(f, "{}", label)
    }
}

/// One document slot
#[derive(Debug, Default)]
pub(crate) struct Slot {
    pub file: Option<StagedFile>,
    pub message: Option<UploadMessage>,
    /// Bumped on every selection; upload responses carry the epoch they were issued under
    pub epoch: u64,
    pub uploads_in_flight: usize,
}

impl Slot {
    /// Stage a file, dropping feedback that belonged to the previous one
    pub fn stage(&mut self, file: StagedFile) {
        self.file = Some(file);
        self.message = None;
        self.epoch += 1;
        self.uploads_in_flight = 0;
    }

    fn snapshot(&self) -> SlotSnapshot {
        SlotSnapshot {
            file_name: self.file.as_ref().map(|f| f.name().to_string()),
            message: self.message.clone(),
            uploading: self.uploads_in_flight > 0,
        }
    }
}

/// Everything the controller holds between operator actions
#[derive(Debug, Default)]
pub(crate) struct WorkflowInner {
    pub slots: [Slot; 2],
    /// Bumped by reset; every remote response is checked against it
    pub generation: u64,
    pub match_in_flight: bool,
    pub result: Option<MatchResult>,
    pub alert: Option<String>,
}

impl WorkflowInner {
    pub fn slot(&self, kind: DocumentKind) -> &Slot {
        &self.slots[kind.index()]
    }

    pub fn slot_mut(&mut self, kind: DocumentKind) -> &mut Slot {
        &mut self.slots[kind.index()]
    }

    pub fn file_name(&self, kind: DocumentKind) -> &str {
        self.slot(kind).file.as_ref().map(|f| f.name()).unwrap_or_default()
    }

    pub fn state(&self) -> WorkflowState {
        let [resume, job] = &self.slots;

        if self.match_in_flight {
            return WorkflowState::Matching;
        }
        if self.result.is_some() {
            return WorkflowState::Matched;
        }
        if self.slots.iter().any(|s| s.uploads_in_flight > 0) {
            return WorkflowState::Uploading;
        }
        if self
            .slots
            .iter()
            .any(|s| s.message.as_ref().is_some_and(UploadMessage::is_confirmed))
        {
            return WorkflowState::Uploaded;
        }
        match (resume.file.is_some(), job.file.is_some()) {
            (true, true) => WorkflowState::BothStaged,
            (true, false) => WorkflowState::ResumeStaged,
            (false, true) => WorkflowState::JobStaged,
            (false, false) => WorkflowState::Idle,
        }
    }

    pub fn snapshot(&self, history_len: usize) -> WorkflowSnapshot {
        WorkflowSnapshot {
            state: self.state(),
            resume: self.slot(DocumentKind::Resume).snapshot(),
            job: self.slot(DocumentKind::JobDescription).snapshot(),
            result: self.result.clone(),
            alert: self.alert.clone(),
            history_len,
        }
    }
}

/// Read-only view of one slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSnapshot {
    pub file_name: Option<String>,
    pub message: Option<UploadMessage>,
    pub uploading: bool,
}

/// Read-only copy of controller state for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowSnapshot {
    pub state: WorkflowState,
    pub resume: SlotSnapshot,
    pub job: SlotSnapshot,
    pub result: Option<MatchResult>,
    /// Blocking alert from the last failed match
    pub alert: Option<String>,
    pub history_len: usize,
}

impl WorkflowSnapshot {
    pub fn slot(&self, kind: DocumentKind) -> &SlotSnapshot {
        match kind {
            DocumentKind::Resume => &self.resume,
            DocumentKind::JobDescription => &self.job,
        }
    }

    /// Exports are offered only while a result is held
    pub fn can_export(&self) -> bool {
        self.result.is_some()
    }
}
