// Application Layer - Workflow, cache, export and session services

pub mod constants;
pub mod export;
pub mod history_cache;
pub mod session_manager;
pub mod workflow;

// Re-exports
pub use export::{ExportArtifact, ExportFormat, ExportReport};
pub use history_cache::{HistoryCache, RefreshOutcome, StaleDataWarning};
pub use session_manager::SessionManager;
pub use workflow::{MatchOutcome, WorkflowController, WorkflowSnapshot, WorkflowState};

use std::sync::{Mutex, MutexGuard, PoisonError};

// State stays usable after a panicked holder; every writer leaves it consistent
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
